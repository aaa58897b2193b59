//! Locus: a cluster of strand-compatible, overlapping features.

use indexmap::{IndexMap, IndexSet};
use std::cmp::Ordering;

use crate::redundancy::cmp_redundant;
use crate::types::{Exon, Feature, FeatureId, Strand};

/// A cluster of overlapping transcripts and gene-like records.
#[derive(Debug, Clone)]
pub struct Locus {
    /// Minimum start over all members.
    pub start: i64,
    /// Maximum end over all members.
    pub end: i64,
    /// Strand used for clustering; resolved by majority vote once loading is done.
    pub strand: Strand,
    pub transcripts: IndexSet<FeatureId>,
    pub gene_likes: IndexSet<FeatureId>,
    /// Union of all member transcripts' exons, start-ascending and non-overlapping.
    pub merged_exons: Vec<Exon>,
    /// Upper-cased gene name -> number of members carrying it.
    pub gene_names: IndexMap<String, usize>,
    /// Gene ID -> number of members carrying it.
    pub gene_ids: IndexMap<String, usize>,
    /// 1-based locus number, assigned after all loci are final.
    pub locus_num: usize,
}

impl Locus {
    /// Create a singleton locus.
    pub fn new(id: FeatureId, feature: &Feature) -> Self {
        let mut locus = Locus {
            start: feature.start,
            end: feature.end,
            strand: feature.strand,
            transcripts: IndexSet::new(),
            gene_likes: IndexSet::new(),
            merged_exons: Vec::new(),
            gene_names: IndexMap::new(),
            gene_ids: IndexMap::new(),
            locus_num: 0,
        };
        locus.insert(id, feature);
        locus
    }

    /// True if `feature` may join this locus: compatible strand and a span
    /// overlapping the locus, padded by `pad`.
    pub fn accepts(&self, feature: &Feature, pad: i64) -> bool {
        self.strand.compatible(feature.strand) && feature.overlaps(self.start, self.end, pad)
    }

    /// Add `feature` as a member if it is accepted. Returns whether it was added.
    pub fn add_feature(&mut self, id: FeatureId, feature: &Feature, pad: i64) -> bool {
        if !self.accepts(feature, pad) {
            return false;
        }
        self.insert(id, feature);
        true
    }

    fn insert(&mut self, id: FeatureId, feature: &Feature) {
        if feature.exons.is_empty() {
            self.gene_likes.insert(id);
        } else {
            self.transcripts.insert(id);
            self.add_exons(&feature.exons);
        }
        self.start = self.start.min(feature.start);
        self.end = self.end.max(feature.end);
    }

    fn add_exons(&mut self, exons: &[Exon]) {
        self.merged_exons.extend_from_slice(exons);
        self.merged_exons.sort_by_key(|e| (e.start, e.end));
        let mut merged: Vec<Exon> = Vec::with_capacity(self.merged_exons.len());
        for exon in self.merged_exons.drain(..) {
            match merged.last_mut() {
                Some(last) if exon.start <= last.end => last.end = last.end.max(exon.end),
                _ => merged.push(exon),
            }
        }
        self.merged_exons = merged;
    }

    /// Absorb all members of `other`.
    pub fn merge(&mut self, other: Locus) {
        self.transcripts.extend(other.transcripts);
        self.gene_likes.extend(other.gene_likes);
        self.add_exons(&other.merged_exons);
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
        if !self.strand.is_known() {
            self.strand = other.strand;
        }
    }

    /// Ordering of loci within a bucket.
    pub fn cmp_span(&self, other: &Locus) -> Ordering {
        (self.start, self.end).cmp(&(other.start, other.end))
    }

    /// Number of bases covered by the merged exons.
    pub fn covered_len(&self) -> i64 {
        self.merged_exons.iter().map(Exon::length).sum()
    }

    /// Member transcripts, best first by exon count, coverage and ID.
    pub fn ranked_transcripts(&self, features: &[Feature]) -> Vec<FeatureId> {
        let mut ranked: Vec<FeatureId> = self.transcripts.iter().copied().collect();
        ranked.sort_by(|a, b| cmp_redundant(&features[b.0], &features[a.0]));
        ranked
    }

    /// Short description: `[start-end] : id1,id2,...`.
    pub fn describe(&self, features: &[Feature]) -> String {
        let ids: Vec<&str> = self
            .transcripts
            .iter()
            .map(|id| features[id.0].id.as_str())
            .collect();
        format!("[{}-{}] : {}", self.start, self.end, ids.join(","))
    }
}
