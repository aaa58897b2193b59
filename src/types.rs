//! Core data structures for gfloci.
//!
//! This module contains the feature records handed over by the parsing layer
//! and the auxiliary per-transcript data attached to them during clustering.

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
    Unknown,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+', '-' or '.'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Positive),
            "-" => Ok(Strand::Negative),
            "." => Ok(Strand::Unknown),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
            Strand::Unknown => ".",
        }
    }

    /// True for `+` and `-`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Strand::Unknown)
    }

    /// Two strands are compatible unless both are known and differ.
    pub fn compatible(&self, other: Strand) -> bool {
        !self.is_known() || !other.is_known() || *self == other
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of bases shared by the closed intervals `[a_start, a_end]` and `[b_start, b_end]`.
pub fn overlap_len(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> i64 {
    (a_end.min(b_end) - a_start.max(b_start) + 1).max(0)
}

/// A closed genomic interval, used for exons, coding regions and merged exons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exon {
    pub start: i64,
    pub end: i64,
}

impl Exon {
    /// Create a new exon with start and end coordinates.
    pub fn new(start: i64, end: i64) -> Self {
        Exon { start, end }
    }

    /// Get exon length.
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Overlap with an arbitrary closed interval.
    pub fn overlap_len(&self, start: i64, end: i64) -> i64 {
        overlap_len(self.start, self.end, start, end)
    }

    /// True if `[start, end]` lies inside this exon.
    pub fn contains(&self, start: i64, end: i64) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Handle of a feature inside its reference sequence bucket.
///
/// Handles are plain indices into the bucket's feature arena; they never own
/// the record they point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub usize);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A gene, transcript or other annotation record.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Record identifier.
    pub id: String,
    /// Reference sequence name.
    pub seqid: String,
    /// Feature type as given by the annotation (gene, mRNA, transcript, ...).
    pub feature_type: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    /// Parent identifier as given by the annotation, or set by gene adoption.
    pub parent_id: Option<String>,
    /// Resolved parent handle within the same bucket.
    pub parent: Option<FeatureId>,
    pub children: Vec<FeatureId>,
    /// Exons, start-ascending.
    pub exons: Vec<Exon>,
    /// Coding region, if any.
    pub cds: Option<Exon>,
    pub attrs: IndexMap<String, String>,
    /// Sum of exon lengths.
    pub covlen: i64,
    /// Cleared when the clustering pass discards the record.
    pub keep: bool,
    /// Cleared when the record should be suppressed on output.
    pub printable: bool,
}

impl Feature {
    /// Create a new feature without exons.
    pub fn new(id: &str, seqid: &str, feature_type: &str, start: i64, end: i64, strand: Strand) -> Self {
        Feature {
            id: id.to_string(),
            seqid: seqid.to_string(),
            feature_type: feature_type.to_string(),
            start,
            end,
            strand,
            parent_id: None,
            parent: None,
            children: Vec::new(),
            exons: Vec::new(),
            cds: None,
            attrs: IndexMap::new(),
            covlen: 0,
            keep: true,
            printable: true,
        }
    }

    /// Replace the exon list, sorting it and updating `covlen`.
    pub fn with_exons(mut self, exons: Vec<Exon>) -> Self {
        self.set_exons(exons);
        self
    }

    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn with_cds(mut self, start: i64, end: i64) -> Self {
        self.cds = Some(Exon::new(start, end));
        self
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.add_attr(key, value);
        self
    }

    /// Replace the exon list, sorting it and updating `covlen`.
    pub fn set_exons(&mut self, mut exons: Vec<Exon>) {
        exons.sort_by_key(|e| (e.start, e.end));
        self.covlen = exons.iter().map(Exon::length).sum();
        self.exons = exons;
    }

    /// Get feature span length.
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn exon_count(&self) -> usize {
        self.exons.len()
    }

    pub fn has_cds(&self) -> bool {
        self.cds.is_some()
    }

    /// Gene records: `gene` or any `*gene` type (e.g. `ncRNA_gene`, `pseudogene`).
    pub fn is_gene(&self) -> bool {
        let ftype = self.feature_type.to_ascii_lowercase();
        ftype.ends_with("gene")
    }

    /// Transcript records: anything with exons, or an RNA/transcript feature type.
    pub fn is_transcript(&self) -> bool {
        if !self.exons.is_empty() {
            return true;
        }
        let ftype = self.feature_type.to_ascii_lowercase();
        ftype == "transcript" || ftype.ends_with("rna") || ftype.ends_with("_transcript")
    }

    /// Span overlap, padded on both sides by `pad`.
    pub fn overlaps(&self, start: i64, end: i64, pad: i64) -> bool {
        self.start <= end + pad && start <= self.end + pad
    }

    /// True if `other`'s span lies within this feature's span.
    pub fn contains(&self, other: &Feature) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn add_attr(&mut self, key: &str, value: &str) {
        self.attrs.insert(key.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attrs.shift_remove(key)
    }

    /// Gene name carried by the record (`gene_name`, then `gene`, then `Name` for genes).
    pub fn gene_name(&self) -> Option<&str> {
        self.attr("gene_name")
            .or_else(|| self.attr("gene"))
            .or_else(|| if self.is_gene() { self.attr("Name") } else { None })
    }

    /// Gene identifier carried by the record itself.
    pub fn gene_id(&self) -> Option<&str> {
        self.attr("gene_id").or_else(|| self.attr("geneID"))
    }
}

/// Auxiliary per-transcript data kept alongside each placed record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptData {
    /// Transcript judged to supersede this one.
    pub replaced_by: Option<FeatureId>,
    /// Strand saved before it was neutralized for single-exon overlap checks.
    pub original_strand: Option<Strand>,
}
