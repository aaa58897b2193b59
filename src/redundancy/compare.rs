//! Transcript redundancy decisions.
//!
//! Two overlapping transcripts are redundant when one's exon/intron structure
//! is equal to, or a compatible subset of, the other's. The comparator names
//! the transcript that should be kept ("bigger"); the caller supersedes the
//! other one.

use std::cmp::Ordering;

use crate::config::{ComparePolicy, MIN_SINGLE_EXON_OVERLAP};
use crate::error::Result;
use crate::redundancy::containment::single_exon_contained;
use crate::types::{overlap_len, Feature};

/// Which argument of [`redundant_transcripts`] is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    First,
    Second,
}

impl Winner {
    /// Pick the retained transcript out of the compared pair.
    pub fn select<'a, T>(&self, first: &'a T, second: &'a T) -> &'a T {
        match self {
            Winner::First => first,
            Winner::Second => second,
        }
    }
}

/// Ordering used to rank redundant transcripts for output.
///
/// More exons first, then larger coverage, then identifier.
pub fn cmp_redundant(a: &Feature, b: &Feature) -> Ordering {
    a.exon_count()
        .cmp(&b.exon_count())
        .then(a.covlen.cmp(&b.covlen))
        .then_with(|| a.id.cmp(&b.id))
}

/// Strict intron chain match.
///
/// Both transcripts must have the same number of introns with identical
/// boundaries. Single-exon transcripts match when they overlap by at least
/// 80% of the longer one.
pub fn transcripts_match(a: &Feature, b: &Feature) -> bool {
    if a.exon_count() != b.exon_count() || a.exons.is_empty() {
        return false;
    }
    if a.exon_count() == 1 {
        let ovlen = a.exons[0].overlap_len(b.exons[0].start, b.exons[0].end);
        let maxlen = a.covlen.max(b.covlen);
        return ovlen as f64 >= maxlen as f64 * MIN_SINGLE_EXON_OVERLAP;
    }
    introns_equal(a, b)
}

/// Every intron of `a` equals the intron at the same position in `b`.
fn introns_equal(a: &Feature, b: &Feature) -> bool {
    a.exons
        .windows(2)
        .zip(b.exons.windows(2))
        .all(|(x, y)| x[0].end == y[0].end && x[1].start == y[1].start)
}

/// Decide whether `ti` and `tj` are redundant and, if so, which one is kept.
///
/// Policies:
/// * `match_all_introns`: multi-exon transcripts must have the same exon count
///   and identical introns; otherwise an intron chain may be a contiguous
///   sub-chain of the other as long as no intron/exon boundary is violated, and
///   a single-exon transcript is collapsed into an exon that contains it.
/// * `fuzz_span`: spans may extend past each other; otherwise the smaller span
///   must be contained in the bigger one.
/// * `single_exon_overlap`: overlaps are padded by one base and terminal exons
///   may run into an intron by a small tolerance.
///
/// Transcripts without exons are never redundant.
pub fn redundant_transcripts(ti: &Feature, tj: &Feature, policy: &ComparePolicy) -> Result<Option<Winner>> {
    let adj = policy.padding();
    if ti.start > tj.end + adj || tj.start > ti.end + adj || !ti.strand.compatible(tj.strand) {
        return Ok(None);
    }
    if ti.exons.is_empty() || tj.exons.is_empty() {
        return Ok(None);
    }

    let imax = ti.exon_count() - 1;
    let jmax = tj.exon_count() - 1;

    if imax == 0 && jmax == 0 {
        return Ok(single_exon_pair(ti, tj, policy));
    }

    if policy.match_all_introns {
        if imax != jmax {
            return Ok(None);
        }
        let (winner, bigger, smaller) = order_by_coverage(ti, tj);
        if !policy.fuzz_span && !bigger.contains(smaller) {
            return Ok(None);
        }
        return Ok(introns_equal(ti, tj).then_some(winner));
    }

    // exon count overrides coverage when the better covered one has fewer exons
    let first_wins = match ti.covlen.cmp(&tj.covlen) {
        Ordering::Greater => ti.exon_count() >= tj.exon_count(),
        Ordering::Less => ti.exon_count() > tj.exon_count(),
        Ordering::Equal => cmp_redundant(ti, tj).is_gt(),
    };
    let (winner, bigger, smaller) = if first_wins {
        (Winner::First, ti, tj)
    } else {
        (Winner::Second, tj, ti)
    };

    if smaller.exon_count() == 1 {
        let contained = single_exon_contained(smaller, bigger, policy)?;
        return Ok(contained.then_some(winner));
    }

    if !policy.fuzz_span && !bigger.contains(smaller) {
        return Ok(None);
    }
    Ok(intron_chain_contained(ti, tj, policy).then_some(winner))
}

/// Split a pair into `(winner, bigger, smaller)` by coverage, ties broken by [`cmp_redundant`].
fn order_by_coverage<'a>(ti: &'a Feature, tj: &'a Feature) -> (Winner, &'a Feature, &'a Feature) {
    let first_bigger = match ti.covlen.cmp(&tj.covlen) {
        Ordering::Equal => cmp_redundant(ti, tj).is_gt(),
        ord => ord.is_gt(),
    };
    if first_bigger {
        (Winner::First, ti, tj)
    } else {
        (Winner::Second, tj, ti)
    }
}

fn single_exon_pair(ti: &Feature, tj: &Feature, policy: &ComparePolicy) -> Option<Winner> {
    let (winner, bigger, smaller) = order_by_coverage(ti, tj);
    let (a, b) = (ti.exons[0], tj.exons[0]);
    let redundant = if !policy.fuzz_span {
        bigger.contains(smaller)
    } else if policy.single_exon_overlap {
        a.overlap_len(b.start - 1, b.end + 1) > 0
    } else {
        let maxlen = ti.covlen.max(tj.covlen);
        overlap_len(a.start, a.end, b.start, b.end) as f64 >= maxlen as f64 * MIN_SINGLE_EXON_OVERLAP
    };
    redundant.then_some(winner)
}

/// Subset intron chain test for two multi-exon transcripts.
///
/// Finds the first pair of overlapping introns with a two-pointer walk; that
/// pair must be identical and must be the first intron of at least one of the
/// chains. From there both chains must agree intron by intron until one runs
/// out, and the exhausted chain's outer ends must not reach into an intron of
/// the other beyond the boundary tolerance.
fn intron_chain_contained(ti: &Feature, tj: &Feature, policy: &ComparePolicy) -> bool {
    let (a, b) = (&ti.exons, &tj.exons);
    let imax = a.len() - 1;
    let jmax = b.len() - 1;

    // intron chains do not overlap at all
    if a[imax].start < b[0].end || b[jmax].start < a[0].end {
        return false;
    }

    // i and j index the exon to the right of the current intron
    let (mut i, mut j) = (1usize, 1usize);
    let (mut ai, mut bj) = ((0i64, 0i64), (0i64, 0i64));
    while i <= imax && j <= jmax {
        ai = (a[i - 1].end, a[i].start);
        bj = (b[j - 1].end, b[j].start);
        if bj.1 < ai.0 {
            j += 1;
            continue;
        }
        if ai.1 < bj.0 {
            i += 1;
            continue;
        }
        break;
    }
    // no overlapping introns, or the first overlap is interior to both chains
    if (i > 1 && j > 1) || i > imax || j > jmax {
        return false;
    }
    if ai != bj {
        return false;
    }

    let tolerance = policy.boundary_tolerance();
    if j > i {
        // ti's chain starts inside tj's: ti must not reach into tj's previous intron
        // and must not extend tj's chain on the right
        if ti.start + tolerance < b[j - 1].start || a[imax].start > b[jmax].start {
            return false;
        }
    } else if i > j && (tj.start + tolerance < a[i - 1].start || b[jmax].start > a[imax].start) {
        return false;
    }

    i += 1;
    j += 1;
    while i <= imax && j <= jmax {
        if a[i - 1].end != b[j - 1].end || a[i].start != b[j].start {
            return false;
        }
        i += 1;
        j += 1;
    }
    i -= 1;
    j -= 1;

    if i == imax && j < jmax {
        // tj continues to the right; ti's end must stay within tj's current exon
        ti.end <= b[j].end + tolerance
    } else if j == jmax && i < imax {
        tj.end <= a[i].end + tolerance
    } else {
        true
    }
}
