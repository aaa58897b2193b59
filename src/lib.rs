//! gfloci - Locus clustering for genomic annotations.
//!
//! This library groups transcripts and gene records into loci: clusters of
//! strand-compatible, overlapping features on one reference sequence. While
//! clustering it detects transcripts made redundant by another transcript of
//! the same locus and marks them as superseded.
//!
//! # Features
//!
//! - Incremental placement of start-sorted records into `(start, end)`-ordered loci
//! - Merging of loci bridged by a new record
//! - Redundancy detection under intron-chain match or containment policies
//! - Parent repair for orphan transcripts
//! - Per-locus strand resolution, gene name/ID tables and global numbering
//! - Independent reference sequences processed in parallel
//!
//! # Example
//!
//! ```ignore
//! use gfloci::config::ClusterOptions;
//! use gfloci::loader::LocusLoader;
//!
//! let loader = LocusLoader::new(ClusterOptions::default());
//! let loaded = loader.load(records)?;
//!
//! for (seqid, locus) in loaded.loci() {
//!     println!("{}\tRLOC_{:08}\t{}\t{}", seqid, locus.locus_num, locus.start, locus.end);
//! }
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod loader;
pub mod redundancy;
pub mod types;

pub use cluster::{Locus, RefSeqBucket};
pub use config::{ClusterOptions, ComparePolicy};
pub use error::LocusError;
pub use loader::{LoadedLoci, LocusLoader};
pub use types::{Exon, Feature, FeatureId, Strand, TranscriptData};
