//! Per-reference-sequence state and the feature placement algorithm.
//!
//! A bucket owns every record seen on one reference sequence, the
//! start-sorted transcript and gene-like lists, and the `(start, end)`-sorted
//! loci. Placement is strictly sequential within a bucket; buckets are
//! independent of each other.

use ahash::AHashMap;
use log::{debug, warn};

use crate::cluster::adoption::adopt_orphan;
use crate::cluster::index::{find_insertion_point, insert_by_start, insert_locus, reposition_locus};
use crate::cluster::locus::Locus;
use crate::config::{ClusterOptions, ComparePolicy};
use crate::error::{LocusError, Result};
use crate::redundancy::{redundant_transcripts, Winner};
use crate::types::{Feature, FeatureId, Strand, TranscriptData};

/// All clustering state for one reference sequence.
#[derive(Debug, Clone, Default)]
pub struct RefSeqBucket {
    pub(crate) seqid: String,
    /// Arena of every record registered here, in arrival order.
    pub(crate) features: Vec<Feature>,
    /// Record identifier -> handle, first registration wins.
    pub(crate) registry: AHashMap<String, FeatureId>,
    /// Transcripts, start-ascending.
    pub(crate) transcripts: Vec<FeatureId>,
    /// Exonless records, start-ascending.
    pub(crate) gene_likes: Vec<FeatureId>,
    /// Loci, `(start, end)`-ascending.
    pub(crate) loci: Vec<Locus>,
    pub(crate) tdata: AHashMap<FeatureId, TranscriptData>,
    pub(crate) f_bases: i64,
    pub(crate) r_bases: i64,
    pub(crate) u_bases: i64,
}

impl RefSeqBucket {
    /// Create an empty bucket for `seqid`.
    pub fn new(seqid: &str) -> Self {
        RefSeqBucket {
            seqid: seqid.to_string(),
            ..Default::default()
        }
    }

    pub fn seqid(&self) -> &str {
        &self.seqid
    }

    /// Register a record and return its handle. Records are not placed yet.
    pub fn add_feature(&mut self, feature: Feature) -> FeatureId {
        let id = FeatureId(self.features.len());
        self.registry.entry(feature.id.clone()).or_insert(id);
        self.features.push(feature);
        id
    }

    /// Link records to parents given by identifier, when the parent is registered here.
    pub fn resolve_parents(&mut self) {
        for idx in 0..self.features.len() {
            if self.features[idx].parent.is_some() {
                continue;
            }
            let child = FeatureId(idx);
            let parent = self.features[idx]
                .parent_id
                .as_ref()
                .and_then(|p| self.registry.get(p))
                .copied();
            if let Some(parent) = parent.filter(|p| *p != child) {
                self.features[idx].parent = Some(parent);
                let children = &mut self.features[parent.0].children;
                if !children.contains(&child) {
                    children.push(child);
                }
            }
        }
    }

    /// Place every registered record, in start order (ties keep arrival order).
    ///
    /// Each record's `keep` flag is set from the placement result. Returns the
    /// number of records kept.
    pub fn place_all(&mut self, opts: &ClusterOptions) -> Result<usize> {
        let mut order: Vec<FeatureId> = (0..self.features.len()).map(FeatureId).collect();
        order.sort_by_key(|id| self.features[id.0].start);
        let mut kept = 0;
        for id in order {
            let keep = self.place(id, opts)?;
            self.features[id.0].keep = keep;
            if keep {
                kept += 1;
            }
        }
        Ok(kept)
    }

    /// Place one record: classify it, then assign it to a new or existing locus,
    /// merging every locus it bridges.
    ///
    /// Records must arrive in non-decreasing start order. Returns whether the
    /// record is kept. A record that was already placed is left untouched.
    pub fn place(&mut self, id: FeatureId, opts: &ClusterOptions) -> Result<bool> {
        if id.0 >= self.features.len() {
            return Err(LocusError::UnknownFeature {
                id: id.to_string(),
                seqid: self.seqid.clone(),
            });
        }
        if self.tdata.contains_key(&id) {
            debug!("{}: '{}' already placed", self.seqid, self.features[id.0].id);
            return Ok(true);
        }

        if opts.adopt_orphans {
            if let Some(gene) = adopt_orphan(self, id, opts) {
                debug!(
                    "{}: '{}' adopted by gene '{}'",
                    self.seqid, self.features[id.0].id, self.features[gene.0].id
                );
            }
        }

        let gene_like = self.features[id.0].exons.is_empty();
        if !gene_like {
            let features = &self.features;
            insert_by_start(&mut self.transcripts, id, |t| features[t.0].start);
            self.tdata.entry(id).or_default();
        } else if self.features[id.0].is_gene() || !opts.transcripts_only {
            let features = &self.features;
            insert_by_start(&mut self.gene_likes, id, |g| features[g.0].start);
            self.tdata.entry(id).or_default();
        } else {
            debug!("{}: '{}' is neither transcript nor gene, skipped", self.seqid, self.features[id.0].id);
            return Ok(false);
        }

        if !opts.cluster {
            return Ok(true);
        }

        if opts.single_exon_overlap && self.features[id.0].exon_count() == 1 {
            // cluster single-exon transcripts with either strand
            let strand = self.features[id.0].strand;
            self.tdata.entry(id).or_default().original_strand = Some(strand);
            self.features[id.0].strand = Strand::Unknown;
        }

        if self.loci.is_empty() {
            self.loci.push(Locus::new(id, &self.features[id.0]));
            return Ok(true);
        }

        let pad = opts.locus_padding();
        let (start, end, strand) = {
            let f = &self.features[id.0];
            (f.start, f.end, f.strand)
        };
        let (t_start, t_end) = (start - pad, end + pad);

        let nidx = match find_insertion_point(t_end, &self.loci, |l| l.start) {
            Some(0) => {
                // every locus starts past this record
                insert_locus(&mut self.loci, Locus::new(id, &self.features[id.0]));
                return Ok(true);
            }
            Some(n) => n,
            None => self.loci.len(),
        };

        let policy = opts.compare_policy();
        // indices of overlapping loci, highest first
        let mut found: Vec<usize> = Vec::new();
        for l in (0..nidx).rev() {
            let locus = &self.loci[l];
            if !locus.strand.compatible(strand) {
                continue;
            }
            if t_start > locus.end {
                if start - locus.start > opts.max_locus_span {
                    break;
                }
                continue;
            }
            if locus.start > t_end {
                warn!(
                    "{}: locus lookup returned a locus starting past '{}' ({} > {})",
                    self.seqid, self.features[id.0].id, locus.start, t_end
                );
                continue;
            }
            if self.loci[l].add_feature(id, &self.features[id.0], pad) {
                found.push(l);
                if opts.collapse_redundant && !gene_like {
                    self.collapse_redundant(l, id, &policy)?;
                }
            }
        }

        let Some(&target) = found.last() else {
            insert_locus(&mut self.loci, Locus::new(id, &self.features[id.0]));
            return Ok(true);
        };
        if found.len() > 1 {
            // absorbed indices are all above the target and removed highest first
            for &l in &found[..found.len() - 1] {
                let absorbed = self.loci.remove(l);
                self.loci[target].merge(absorbed);
            }
            debug!(
                "{}: merged {} loci into {}",
                self.seqid,
                found.len(),
                self.loci[target].describe(&self.features)
            );
        }
        reposition_locus(&mut self.loci, target);
        Ok(true)
    }

    /// Compare transcript `id` against every live transcript of locus `l`.
    fn collapse_redundant(&mut self, l: usize, id: FeatureId, policy: &ComparePolicy) -> Result<()> {
        let others: Vec<FeatureId> = self.loci[l]
            .transcripts
            .iter()
            .copied()
            .filter(|&o| o != id)
            .collect();
        for other in others {
            if self.is_superseded(other) {
                continue;
            }
            let winner = redundant_transcripts(&self.features[id.0], &self.features[other.0], policy)?;
            let Some(winner) = winner else { continue };
            let (container, contained) = *winner.select(&(id, other), &(other, id));
            self.tdata.entry(contained).or_default().replaced_by = Some(container);
            self.preserve_contained_cds(container, contained);
            if winner == Winner::Second {
                debug!(
                    "{}: '{}' is redundant with '{}'",
                    self.seqid, self.features[id.0].id, self.features[other.0].id
                );
            }
        }
        Ok(())
    }

    /// Copy the coding region of `contained` onto `container` if the latter has none.
    fn preserve_contained_cds(&mut self, container: FeatureId, contained: FeatureId) {
        if self.features[container.0].has_cds() {
            return;
        }
        if let Some(cds) = self.features[contained.0].cds {
            self.features[container.0].cds = Some(cds);
        }
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.0)
    }

    /// Look up a record by identifier.
    pub fn find(&self, id: &str) -> Option<FeatureId> {
        self.registry.get(id).copied()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn loci(&self) -> &[Locus] {
        &self.loci
    }

    /// Placed transcripts, start-ascending.
    pub fn transcripts(&self) -> &[FeatureId] {
        &self.transcripts
    }

    /// Placed exonless records, start-ascending.
    pub fn gene_likes(&self) -> &[FeatureId] {
        &self.gene_likes
    }

    pub fn transcript_data(&self, id: FeatureId) -> Option<&TranscriptData> {
        self.tdata.get(&id)
    }

    /// The transcript that supersedes `id`, if any.
    pub fn replaced_by(&self, id: FeatureId) -> Option<FeatureId> {
        self.tdata.get(&id).and_then(|d| d.replaced_by)
    }

    pub fn is_superseded(&self, id: FeatureId) -> bool {
        self.replaced_by(id).is_some()
    }

    /// Kept, printable and not superseded.
    pub fn is_reportable(&self, id: FeatureId) -> bool {
        self.feature(id)
            .is_some_and(|f| f.keep && f.printable && !self.is_superseded(id))
    }

    /// Index of the locus holding `id`, if any.
    pub fn locus_of(&self, id: FeatureId) -> Option<usize> {
        self.loci
            .iter()
            .position(|l| l.transcripts.contains(&id) || l.gene_likes.contains(&id))
    }

    /// Covered bases on the positive, negative and undetermined strand.
    pub fn coverage_totals(&self) -> (i64, i64, i64) {
        (self.f_bases, self.r_bases, self.u_bases)
    }
}
