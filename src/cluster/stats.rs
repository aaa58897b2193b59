//! Post-pass over finalized loci.
//!
//! Resolves each locus's strand, gathers gene name/ID frequency tables,
//! optionally totals covered bases per strand, and numbers the loci.

use indexmap::IndexMap;

use crate::cluster::bucket::RefSeqBucket;
use crate::types::{Feature, Strand};

fn count(table: &mut IndexMap<String, usize>, key: String) {
    *table.entry(key).or_insert(0) += 1;
}

/// Gene ID of a transcript: its own attribute, or its parent's identifier.
fn transcript_gene_id<'a>(t: &'a Feature, features: &'a [Feature]) -> Option<&'a str> {
    t.gene_id()
        .or_else(|| t.parent.map(|p| features[p.0].id.as_str()))
}

/// Resolve strand and frequency tables for every locus of one bucket.
///
/// Strands neutralized for single-exon clustering are restored on the
/// records first. Loci with transcripts on both strands, or on none, get `.`.
pub fn collect_bucket_stats(bucket: &mut RefSeqBucket, coverage_totals: bool) {
    let RefSeqBucket {
        features,
        loci,
        tdata,
        f_bases,
        r_bases,
        u_bases,
        ..
    } = bucket;

    for locus in loci.iter_mut() {
        let mut gene_names: IndexMap<String, usize> = IndexMap::new();
        let mut gene_ids: IndexMap<String, usize> = IndexMap::new();
        let (mut fwd, mut rev) = (0usize, 0usize);

        for id in &locus.transcripts {
            if let Some(strand) = tdata.get(id).and_then(|d| d.original_strand) {
                features[id.0].strand = strand;
            }
            let t = &features[id.0];
            match t.strand {
                Strand::Positive => fwd += 1,
                Strand::Negative => rev += 1,
                Strand::Unknown => {}
            }
            if let Some(name) = t.gene_name().filter(|n| !n.is_empty()) {
                count(&mut gene_names, name.to_uppercase());
            }
            if let Some(gid) = transcript_gene_id(t, features).filter(|g| !g.is_empty()) {
                count(&mut gene_ids, gid.to_string());
            }
        }

        locus.strand = match (fwd, rev) {
            (0, 0) => Strand::Unknown,
            (_, 0) => Strand::Positive,
            (0, _) => Strand::Negative,
            _ => Strand::Unknown,
        };

        for g in locus.gene_likes.iter().map(|id| &features[id.0]) {
            if !g.is_gene() {
                continue;
            }
            if let Some(name) = g.gene_name().filter(|n| !n.is_empty()) {
                count(&mut gene_names, name.to_uppercase());
            }
            if !g.id.is_empty() {
                count(&mut gene_ids, g.id.clone());
            }
        }

        if coverage_totals {
            let covered = locus.covered_len();
            match locus.strand {
                Strand::Positive => *f_bases += covered,
                Strand::Negative => *r_bases += covered,
                Strand::Unknown => *u_bases += covered,
            }
        }

        locus.gene_names = gene_names;
        locus.gene_ids = gene_ids;
    }
}

/// Run [`collect_bucket_stats`] on every bucket, then number all loci 1..N in
/// bucket order and locus order.
pub fn collect_locus_data(buckets: &mut [RefSeqBucket], coverage_totals: bool) {
    for bucket in buckets.iter_mut() {
        collect_bucket_stats(bucket, coverage_totals);
    }
    number_loci(buckets);
}

/// Assign sequential 1-based locus numbers across buckets.
pub fn number_loci(buckets: &mut [RefSeqBucket]) -> usize {
    let mut locus_num = 0;
    for locus in buckets.iter_mut().flat_map(|b| b.loci.iter_mut()) {
        locus_num += 1;
        locus.locus_num = locus_num;
    }
    locus_num
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterOptions;
    use crate::types::{Exon, FeatureId};

    fn tx(id: &str, start: i64, end: i64, strand: Strand) -> Feature {
        Feature::new(id, "chr1", "mRNA", start, end, strand).with_exons(vec![Exon::new(start, end)])
    }

    fn loaded(features: Vec<Feature>, opts: &ClusterOptions) -> RefSeqBucket {
        let mut bucket = RefSeqBucket::new("chr1");
        for f in features {
            bucket.add_feature(f);
        }
        bucket.resolve_parents();
        bucket.place_all(opts).unwrap();
        bucket
    }

    #[test]
    fn test_strand_vote() {
        let opts = ClusterOptions {
            collapse_redundant: false,
            ..ClusterOptions::default()
        };
        let mut bucket = loaded(
            vec![
                tx("A", 100, 200, Strand::Positive),
                tx("B", 150, 250, Strand::Unknown),
                tx("C", 1000, 1100, Strand::Unknown),
            ],
            &opts,
        );
        collect_bucket_stats(&mut bucket, false);
        assert_eq!(bucket.loci[0].strand, Strand::Positive);
        assert_eq!(bucket.loci[1].strand, Strand::Unknown);
    }

    #[test]
    fn test_restores_neutralized_strand() {
        let opts = ClusterOptions {
            single_exon_overlap: true,
            collapse_redundant: false,
            ..ClusterOptions::default()
        };
        let mut bucket = loaded(
            vec![
                tx("A", 100, 200, Strand::Positive),
                tx("B", 150, 250, Strand::Negative),
            ],
            &opts,
        );
        assert_eq!(bucket.features[0].strand, Strand::Unknown);
        collect_bucket_stats(&mut bucket, true);
        assert_eq!(bucket.features[0].strand, Strand::Positive);
        assert_eq!(bucket.features[1].strand, Strand::Negative);
        assert_eq!(bucket.loci[0].strand, Strand::Unknown);
        assert_eq!(bucket.coverage_totals(), (0, 0, 151));
    }

    #[test]
    fn test_gene_tables() {
        let gene = Feature::new("G1", "chr1", "gene", 50, 500, Strand::Positive).with_attr("Name", "abc1");
        let t1 = tx("T1", 100, 200, Strand::Positive)
            .with_parent("G1")
            .with_attr("gene_name", "Abc1");
        let t2 = tx("T2", 300, 400, Strand::Positive).with_attr("gene_id", "GX");
        let mut bucket = loaded(vec![gene, t1, t2], &ClusterOptions::default());
        collect_bucket_stats(&mut bucket, false);

        let locus = &bucket.loci[0];
        assert_eq!(locus.gene_names.get("ABC1"), Some(&2));
        assert_eq!(locus.gene_ids.get("G1"), Some(&2));
        assert_eq!(locus.gene_ids.get("GX"), Some(&1));
    }

    #[test]
    fn test_coverage_by_strand() {
        let opts = ClusterOptions::default();
        let mut bucket = loaded(
            vec![
                tx("A", 100, 199, Strand::Positive),
                tx("B", 500, 549, Strand::Negative),
            ],
            &opts,
        );
        collect_bucket_stats(&mut bucket, true);
        assert_eq!(bucket.coverage_totals(), (100, 50, 0));
    }

    #[test]
    fn test_numbering_spans_buckets() {
        let opts = ClusterOptions::default();
        let mut buckets = vec![
            loaded(
                vec![tx("A", 1, 50, Strand::Positive), tx("B", 60, 90, Strand::Positive)],
                &opts,
            ),
            loaded(vec![tx("C", 1, 50, Strand::Positive)], &opts),
        ];
        collect_locus_data(&mut buckets, false);
        let nums: Vec<usize> = buckets
            .iter()
            .flat_map(|b| b.loci.iter().map(|l| l.locus_num))
            .collect();
        assert_eq!(nums, vec![1, 2, 3]);
        assert_eq!(buckets[0].loci[0].transcripts[0], FeatureId(0));
    }
}
