//! Loading pass: groups a record stream by reference sequence and clusters it.
//!
//! Records are filtered (locus meta-features, pseudogenes, caller validation),
//! registered into per-sequence buckets, and then placed bucket by bucket.
//! Buckets share nothing but the read-only options, so they are processed in
//! parallel when more than one worker thread is configured.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info, log, Level};
use rayon::prelude::*;

use crate::cluster::{collect_locus_data, Locus, RefSeqBucket};
use crate::config::ClusterOptions;
use crate::types::Feature;

/// Caller-supplied record filter; records it rejects are skipped.
pub type ValidateFn = dyn Fn(&Feature) -> bool + Send + Sync;

/// Clustered result of one loading pass.
#[derive(Debug, Default)]
pub struct LoadedLoci {
    /// One bucket per reference sequence, in order of first appearance.
    pub buckets: Vec<RefSeqBucket>,
}

impl LoadedLoci {
    pub fn bucket(&self, seqid: &str) -> Option<&RefSeqBucket> {
        self.buckets.iter().find(|b| b.seqid() == seqid)
    }

    /// All loci with their reference sequence, in numbering order.
    pub fn loci(&self) -> impl Iterator<Item = (&str, &Locus)> {
        self.buckets
            .iter()
            .flat_map(|b| b.loci().iter().map(move |l| (b.seqid(), l)))
    }

    pub fn locus_count(&self) -> usize {
        self.buckets.iter().map(|b| b.loci().len()).sum()
    }
}

/// Drives the clustering pass over a stream of parsed records.
pub struct LocusLoader {
    options: ClusterOptions,
    validate: Option<Box<ValidateFn>>,
}

impl LocusLoader {
    pub fn new(options: ClusterOptions) -> Self {
        LocusLoader {
            options,
            validate: None,
        }
    }

    /// Install a record filter run before placement.
    pub fn with_validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Feature) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(validate));
        self
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Cluster `records`, which must be sorted by start within each reference sequence.
    pub fn load<I>(&self, records: I) -> Result<LoadedLoci>
    where
        I: IntoIterator<Item = Feature>,
    {
        let opts = &self.options;
        opts.validate()?;

        let mut buckets: IndexMap<String, RefSeqBucket> = IndexMap::new();
        let mut total = 0usize;
        for mut record in records {
            total += 1;
            if is_locus_meta_feature(&record) {
                continue;
            }
            if opts.no_pseudo && is_pseudo(&record) {
                let level = if opts.verbose { Level::Info } else { Level::Debug };
                log!(level, "pseudo gene/transcript record with ID={} discarded", record.id);
                continue;
            }
            if record.attr("locus").is_some_and(|l| l.starts_with("RLOC_")) {
                record.remove_attr("locus");
            }
            if let Some(validate) = &self.validate {
                if !validate(&record) {
                    continue;
                }
            }
            buckets
                .entry(record.seqid.clone())
                .or_insert_with_key(|seqid| RefSeqBucket::new(seqid))
                .add_feature(record);
        }
        let mut buckets: Vec<RefSeqBucket> = buckets.into_values().collect();
        debug!("{} records read, {} reference sequences", total, buckets.len());

        let num_threads = opts.worker_threads();
        let kept: usize = if num_threads == 1 || buckets.len() < 2 {
            buckets
                .iter_mut()
                .map(|b| cluster_bucket(b, opts))
                .sum::<crate::error::Result<usize>>()?
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .context("Failed to create thread pool")?;
            pool.install(|| {
                buckets
                    .par_iter_mut()
                    .map(|b| cluster_bucket(b, opts))
                    .sum::<crate::error::Result<usize>>()
            })?
        };

        collect_locus_data(&mut buckets, opts.coverage_totals);
        let result = LoadedLoci { buckets };
        info!(
            "{} of {} records kept, clustered into {} loci",
            kept,
            total,
            result.locus_count()
        );
        Ok(result)
    }
}

fn cluster_bucket(bucket: &mut RefSeqBucket, opts: &ClusterOptions) -> crate::error::Result<usize> {
    bucket.resolve_parents();
    bucket.place_all(opts)
}

/// `locus` records listing their transcripts describe an earlier clustering run.
fn is_locus_meta_feature(f: &Feature) -> bool {
    f.feature_type == "locus" && f.attr("transcripts").is_some()
}

/// Pseudogene records, by feature type or by flag/type attributes.
pub fn is_pseudo(f: &Feature) -> bool {
    if f.feature_type.starts_with("pseudo") {
        return true;
    }
    f.attrs.iter().any(|(name, value)| {
        let name = name.to_ascii_lowercase();
        let flagged = is_pseudo_flag_name(&name)
            && matches!(value.chars().next().map(|c| c.to_ascii_lowercase()), Some('t' | 'y' | '1'));
        let typed = name.ends_with("type") && (value.starts_with("pseudogene") || value.ends_with("_pseudogene"));
        flagged || typed
    })
}

/// `pseudo*`, `is<pseudo>*` or `is_<pseudo>*` (lowercased name).
fn is_pseudo_flag_name(name: &str) -> bool {
    match name.find("pseudo") {
        Some(0) => true,
        Some(2) => name.starts_with("is"),
        Some(3) => name.starts_with("is_"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exon, Strand};

    fn tx(id: &str, seqid: &str, start: i64, end: i64) -> Feature {
        Feature::new(id, seqid, "mRNA", start, end, Strand::Positive).with_exons(vec![Exon::new(start, end)])
    }

    #[test]
    fn test_is_pseudo() {
        let f = Feature::new("P1", "chr1", "pseudogene", 1, 10, Strand::Positive);
        assert!(is_pseudo(&f));

        let f = tx("T1", "chr1", 1, 10).with_attr("pseudo", "true");
        assert!(is_pseudo(&f));
        let f = tx("T1", "chr1", 1, 10).with_attr("isPseudo", "1");
        assert!(is_pseudo(&f));
        let f = tx("T1", "chr1", 1, 10).with_attr("is_pseudo", "yes");
        assert!(is_pseudo(&f));
        let f = tx("T1", "chr1", 1, 10).with_attr("pseudo", "false");
        assert!(!is_pseudo(&f));
        let f = tx("T1", "chr1", 1, 10).with_attr("gene_type", "unitary_pseudogene");
        assert!(is_pseudo(&f));
        let f = tx("T1", "chr1", 1, 10).with_attr("gene_type", "protein_coding");
        assert!(!is_pseudo(&f));
        let f = tx("T1", "chr1", 1, 10).with_attr("note", "pseudogene");
        assert!(!is_pseudo(&f));
    }

    #[test]
    fn test_locus_meta_feature() {
        let f = Feature::new("L1", "chr1", "locus", 1, 10, Strand::Positive).with_attr("transcripts", "T1,T2");
        assert!(is_locus_meta_feature(&f));
        let f = Feature::new("L1", "chr1", "locus", 1, 10, Strand::Positive);
        assert!(!is_locus_meta_feature(&f));
    }

    #[test]
    fn test_groups_by_reference_sequence() {
        let loader = LocusLoader::new(ClusterOptions::default());
        let loaded = loader
            .load(vec![
                tx("A", "chr2", 1, 50),
                tx("B", "chr1", 1, 50),
                tx("C", "chr2", 40, 80),
            ])
            .unwrap();
        let seqids: Vec<&str> = loaded.buckets.iter().map(|b| b.seqid()).collect();
        assert_eq!(seqids, vec!["chr2", "chr1"]);
        assert_eq!(loaded.bucket("chr2").unwrap().loci().len(), 1);
        assert_eq!(loaded.locus_count(), 2);
        let nums: Vec<usize> = loaded.loci().map(|(_, l)| l.locus_num).collect();
        assert_eq!(nums, vec![1, 2]);
    }

    #[test]
    fn test_filters() {
        let opts = ClusterOptions {
            no_pseudo: true,
            ..ClusterOptions::default()
        };
        let loader = LocusLoader::new(opts).with_validator(|f| f.id != "DROP");
        let loaded = loader
            .load(vec![
                tx("A", "chr1", 1, 50).with_attr("locus", "RLOC_00001"),
                tx("DROP", "chr1", 10, 60),
                tx("P", "chr1", 20, 70).with_attr("pseudo", "true"),
                Feature::new("L", "chr1", "locus", 1, 70, Strand::Positive).with_attr("transcripts", "A"),
            ])
            .unwrap();
        let bucket = loaded.bucket("chr1").unwrap();
        assert_eq!(bucket.features().len(), 1);
        assert_eq!(bucket.features()[0].attr("locus"), None);
    }

    #[test]
    fn test_rejects_invalid_options() {
        let opts = ClusterOptions {
            max_locus_span: -1,
            ..ClusterOptions::default()
        };
        assert!(LocusLoader::new(opts).load(Vec::new()).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records = || {
            (0..6)
                .flat_map(|c| {
                    let seqid = format!("chr{}", c);
                    (0..20).map(move |i| tx(&format!("T{}_{}", c, i), &seqid, i * 30, i * 30 + 40))
                })
                .collect::<Vec<_>>()
        };
        let sequential = LocusLoader::new(ClusterOptions::default()).load(records()).unwrap();
        let parallel = LocusLoader::new(ClusterOptions {
            threads: 4,
            ..ClusterOptions::default()
        })
        .load(records())
        .unwrap();
        let spans = |l: &LoadedLoci| -> Vec<(String, i64, i64, usize)> {
            l.loci()
                .map(|(s, locus)| (s.to_string(), locus.start, locus.end, locus.locus_num))
                .collect()
        };
        assert_eq!(spans(&sequential), spans(&parallel));
    }
}
