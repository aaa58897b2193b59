//! Single-exon containment check.
//!
//! Decides whether a single-exon transcript is covered by one exon of another
//! transcript without reaching into any of its introns.

use crate::config::{ComparePolicy, MIN_SINGLE_EXON_OVERLAP};
use crate::error::{LocusError, Result};
use crate::types::Feature;

/// Check whether `single` sits inside one of `other`'s exons.
///
/// With `fuzz_span`, the first sufficiently overlapping exon decides: any
/// overlap of the padded span under the single-exon overlap policy, otherwise
/// at least 80% of `single`'s length. That exon must not let `single` cross
/// into a flanking intron by more than the boundary tolerance. Without
/// `fuzz_span`, `single` must lie entirely within one exon.
///
/// Returns an error if `single` has more than one exon.
pub fn single_exon_contained(single: &Feature, other: &Feature, policy: &ComparePolicy) -> Result<bool> {
    if single.exon_count() > 1 {
        return Err(LocusError::NotSingleExon {
            id: single.id.clone(),
            exons: single.exon_count(),
        });
    }

    if !policy.fuzz_span {
        return Ok(other
            .exons
            .iter()
            .any(|exon| exon.contains(single.start, single.end)));
    }

    let tolerance = policy.boundary_tolerance();
    let last = other.exons.len().saturating_sub(1);
    let min_overlap = MIN_SINGLE_EXON_OVERLAP * single.length() as f64;

    for (j, exon) in other.exons.iter().enumerate() {
        let overlapping = if policy.single_exon_overlap {
            exon.overlap_len(single.start - 1, single.end + 1) > 0
        } else {
            exon.overlap_len(single.start, single.end) as f64 >= min_overlap
        };
        if !overlapping {
            continue;
        }
        // must not run into the introns flanking this exon
        let crosses_left = j > 0 && single.start + tolerance < exon.start;
        let crosses_right = j < last && single.end > exon.end + tolerance;
        return Ok(!(crosses_left || crosses_right));
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exon, Strand};

    fn single(start: i64, end: i64) -> Feature {
        Feature::new("S", "chr1", "mRNA", start, end, Strand::Positive)
            .with_exons(vec![Exon::new(start, end)])
    }

    fn multi() -> Feature {
        Feature::new("M", "chr1", "mRNA", 100, 600, Strand::Positive).with_exons(vec![
            Exon::new(100, 200),
            Exon::new(300, 400),
            Exon::new(500, 600),
        ])
    }

    fn fuzzy() -> ComparePolicy {
        ComparePolicy {
            fuzz_span: true,
            ..ComparePolicy::default()
        }
    }

    #[test]
    fn test_strict_containment() {
        let policy = ComparePolicy::default();
        assert!(single_exon_contained(&single(320, 380), &multi(), &policy).unwrap());
        assert!(single_exon_contained(&single(300, 400), &multi(), &policy).unwrap());
        assert!(!single_exon_contained(&single(290, 380), &multi(), &policy).unwrap());
    }

    #[test]
    fn test_fuzzy_internal_exon_boundary() {
        // 90% of the single exon overlaps, but it starts inside the preceding intron
        let s = single(290, 389);
        assert!(!single_exon_contained(&s, &multi(), &fuzzy()).unwrap());
    }

    #[test]
    fn test_fuzzy_terminal_exon_extension() {
        // extending past the first exon's outer edge is fine
        let s = single(90, 180);
        assert!(single_exon_contained(&s, &multi(), &fuzzy()).unwrap());
        // but not past its inner edge
        let s = single(120, 210);
        assert!(!single_exon_contained(&s, &multi(), &fuzzy()).unwrap());
    }

    #[test]
    fn test_padded_policy_tolerates_boundary_slop() {
        let policy = ComparePolicy {
            fuzz_span: true,
            single_exon_overlap: true,
            ..ComparePolicy::default()
        };
        assert!(single_exon_contained(&single(280, 390), &multi(), &policy).unwrap());
        assert!(!single_exon_contained(&single(270, 390), &multi(), &policy).unwrap());
    }

    #[test]
    fn test_rejects_multi_exon_argument() {
        let err = single_exon_contained(&multi(), &single(1, 10), &fuzzy()).unwrap_err();
        assert_eq!(
            err,
            LocusError::NotSingleExon {
                id: "M".to_string(),
                exons: 3
            }
        );
    }
}
