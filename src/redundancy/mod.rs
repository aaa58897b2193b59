//! Redundant transcript detection.

pub mod compare;
pub mod containment;

pub use compare::{cmp_redundant, redundant_transcripts, transcripts_match, Winner};
pub use containment::single_exon_contained;
