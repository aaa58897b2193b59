//! Configuration and defaults for gfloci.
//!
//! This module contains the option structure that selects which clustering
//! and redundancy branches run. It is read-only once the loading pass starts.

use clap::{ArgAction, Args};

use crate::error::{LocusError, Result};

/// Maximum distance scanned back from a new record before giving up on older loci.
pub const DEFAULT_MAX_LOCUS_SPAN: i64 = 7_000_000;

/// Intron-boundary slack allowed under the single-exon overlap policy.
pub const SET_BOUNDARY_TOLERANCE: i64 = 25;

/// Minimum overlap fraction for fuzzy single-exon redundancy.
pub const MIN_SINGLE_EXON_OVERLAP: f64 = 0.8;

/// Options for the locus clustering pass.
///
/// Derives [`clap::Args`] so a command-line front end can flatten it into its
/// own parser.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct ClusterOptions {
    /// Skip locus clustering entirely
    #[arg(long = "no-cluster", action = ArgAction::SetFalse)]
    pub cluster: bool,
    /// Keep redundant transcripts instead of collapsing them
    #[arg(long = "no-collapse", action = ArgAction::SetFalse)]
    pub collapse_redundant: bool,
    /// Only collapse transcripts with identical intron chains
    #[arg(long = "match-all-introns")]
    pub match_all_introns: bool,
    /// Do not require span containment for redundant transcripts
    #[arg(long = "fuzz-span")]
    pub fuzz_span: bool,
    /// Cluster single-exon transcripts on both strands with padded overlaps
    #[arg(long = "single-exon-overlap")]
    pub single_exon_overlap: bool,
    /// Only keep transcripts (and genes parenting them)
    #[arg(long = "transcripts-only")]
    pub transcripts_only: bool,
    /// Do not attach orphan transcripts to enclosing genes
    #[arg(long = "no-adoption", action = ArgAction::SetFalse)]
    pub adopt_orphans: bool,
    /// Keep gene records printable in transcripts-only mode
    #[arg(long = "keep-genes")]
    pub keep_genes: bool,
    /// Discard pseudogene records
    #[arg(long = "no-pseudo")]
    pub no_pseudo: bool,
    /// Accumulate per-strand covered-base totals
    #[arg(long = "coverage-totals")]
    pub coverage_totals: bool,
    /// Report discarded records
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    /// Maximum locus span scanned for overlaps
    #[arg(long = "max-locus-span", default_value_t = DEFAULT_MAX_LOCUS_SPAN)]
    pub max_locus_span: i64,
    /// Number of worker threads (0 = auto-detect, 1 = sequential)
    #[arg(long = "threads", short = 'j', default_value_t = 1)]
    pub threads: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterOptions {
            cluster: true,
            collapse_redundant: true,
            match_all_introns: false,
            fuzz_span: false,
            single_exon_overlap: false,
            transcripts_only: false,
            adopt_orphans: true,
            keep_genes: false,
            no_pseudo: false,
            coverage_totals: false,
            verbose: false,
            max_locus_span: DEFAULT_MAX_LOCUS_SPAN,
            threads: 1,
        }
    }
}

/// The three policies consulted by the redundancy comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComparePolicy {
    pub match_all_introns: bool,
    pub fuzz_span: bool,
    pub single_exon_overlap: bool,
}

impl ComparePolicy {
    /// Padding applied to span overlap tests.
    pub fn padding(&self) -> i64 {
        if self.single_exon_overlap {
            1
        } else {
            0
        }
    }

    /// Slack allowed where a terminal exon meets an intron of the other chain.
    pub fn boundary_tolerance(&self) -> i64 {
        if self.single_exon_overlap {
            SET_BOUNDARY_TOLERANCE
        } else {
            0
        }
    }
}

impl ClusterOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject option combinations the clustering pass cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_locus_span <= 0 {
            return Err(LocusError::InvalidParameter {
                parameter: "max_locus_span".to_string(),
                reason: format!("must be positive, got {}", self.max_locus_span),
            });
        }
        Ok(())
    }

    pub fn compare_policy(&self) -> ComparePolicy {
        ComparePolicy {
            match_all_introns: self.match_all_introns,
            fuzz_span: self.fuzz_span,
            single_exon_overlap: self.single_exon_overlap,
        }
    }

    /// Padding applied when looking up overlapping loci.
    pub fn locus_padding(&self) -> i64 {
        self.compare_policy().padding()
    }

    /// Resolve the worker count, mapping 0 to the number of CPUs.
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
