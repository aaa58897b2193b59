//! Ordered lookups over loci and start-sorted feature lists.

use crate::cluster::locus::Locus;

/// Find the index of the first item whose start lies above `x`.
///
/// Items must be sorted by start. Items starting exactly at `x` are skipped,
/// so ties resolve to the position after the last equal start. Returns `None`
/// when no item starts above `x`; `Some(0)` means every item does.
pub fn find_insertion_point<T, F>(x: i64, items: &[T], start: F) -> Option<usize>
where
    F: Fn(&T) -> i64,
{
    let idx = items.partition_point(|item| start(item) <= x);
    (idx < items.len()).then_some(idx)
}

/// Insert `value` into a start-sorted list, after any entries with the same start.
pub fn insert_by_start<T, F>(items: &mut Vec<T>, value: T, start: F)
where
    F: Fn(&T) -> i64,
{
    let x = start(&value);
    match find_insertion_point(x, items, start) {
        Some(idx) => items.insert(idx, value),
        None => items.push(value),
    }
}

/// Insert a locus keeping the list ordered by `(start, end)`. Returns its index.
pub fn insert_locus(loci: &mut Vec<Locus>, locus: Locus) -> usize {
    let idx = loci.partition_point(|l| l.cmp_span(&locus).is_le());
    loci.insert(idx, locus);
    idx
}

/// Move the locus at `idx` by adjacent swaps until `(start, end)` order holds again.
///
/// Only this locus may be out of place, so on sorted input this takes few
/// swaps. Returns the final index.
pub fn reposition_locus(loci: &mut [Locus], mut idx: usize) -> usize {
    while idx > 0 && loci[idx].cmp_span(&loci[idx - 1]).is_lt() {
        loci.swap(idx, idx - 1);
        idx -= 1;
    }
    while idx + 1 < loci.len() && loci[idx + 1].cmp_span(&loci[idx]).is_lt() {
        loci.swap(idx, idx + 1);
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exon, Feature, FeatureId, Strand};

    fn locus(start: i64, end: i64) -> Locus {
        let t = Feature::new("T", "chr1", "mRNA", start, end, Strand::Positive)
            .with_exons(vec![Exon::new(start, end)]);
        Locus::new(FeatureId(0), &t)
    }

    #[test]
    fn test_find_insertion_point() {
        let starts = [10i64, 20, 20, 20, 40];
        assert_eq!(find_insertion_point(5, &starts, |s| *s), Some(0));
        assert_eq!(find_insertion_point(10, &starts, |s| *s), Some(1));
        assert_eq!(find_insertion_point(20, &starts, |s| *s), Some(4));
        assert_eq!(find_insertion_point(25, &starts, |s| *s), Some(4));
        assert_eq!(find_insertion_point(40, &starts, |s| *s), None);
        assert_eq!(find_insertion_point(99, &starts, |s| *s), None);
        assert_eq!(find_insertion_point::<i64, _>(1, &[], |s| *s), None);
    }

    #[test]
    fn test_insert_by_start_is_stable() {
        let mut items = vec![(10, 'a'), (20, 'b')];
        insert_by_start(&mut items, (10, 'c'), |i| i.0);
        insert_by_start(&mut items, (30, 'd'), |i| i.0);
        insert_by_start(&mut items, (1, 'e'), |i| i.0);
        let tags: Vec<char> = items.iter().map(|i| i.1).collect();
        assert_eq!(tags, vec!['e', 'a', 'c', 'b', 'd']);
    }

    #[test]
    fn test_insert_locus_ordering() {
        let mut loci = vec![locus(10, 50), locus(60, 90)];
        assert_eq!(insert_locus(&mut loci, locus(10, 20)), 0);
        assert_eq!(insert_locus(&mut loci, locus(100, 120)), 3);
        assert_eq!(insert_locus(&mut loci, locus(10, 50)), 2);
    }

    #[test]
    fn test_reposition_locus() {
        let mut loci = vec![locus(10, 50), locus(20, 30), locus(40, 60)];
        loci[2].start = 5;
        assert_eq!(reposition_locus(&mut loci, 2), 0);
        assert_eq!(loci[0].start, 5);

        let mut loci = vec![locus(10, 50), locus(10, 60), locus(30, 40)];
        loci[0].end = 70;
        assert_eq!(reposition_locus(&mut loci, 0), 1);
        assert_eq!((loci[1].start, loci[1].end), (10, 70));
    }
}
