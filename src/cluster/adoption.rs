//! Parent repair for orphan transcripts.
//!
//! Some annotations list transcripts without a parent link even though an
//! enclosing gene record was emitted just before them. Such transcripts are
//! attached to the nearest preceding compatible gene on the same sequence.

use crate::cluster::bucket::RefSeqBucket;
use crate::config::ClusterOptions;
use crate::types::{Feature, FeatureId, Strand};

/// A gene can adopt `t` if it is an exonless gene on a compatible strand whose span contains `t`.
fn can_adopt(gene: &Feature, t: &Feature) -> bool {
    gene.is_gene()
        && gene.exons.is_empty()
        && (t.strand == Strand::Unknown || t.strand == gene.strand)
        && gene.contains(t)
}

/// Attach the parentless transcript `id` to a preceding enclosing gene.
///
/// Only the resolved parent link counts: a transcript naming a parent that is
/// not registered in the bucket is still an orphan, so parents must be
/// resolved before placement. Gene-like records are scanned most recent first
/// and the scan stops at the first one ending before the transcript starts.
/// Returns the adopting gene.
pub fn adopt_orphan(bucket: &mut RefSeqBucket, id: FeatureId, opts: &ClusterOptions) -> Option<FeatureId> {
    let t = &bucket.features[id.0];
    if t.parent.is_some() || !t.is_transcript() {
        return None;
    }

    let gene = bucket
        .gene_likes
        .iter()
        .rev()
        .take_while(|g| bucket.features[g.0].end >= t.start)
        .find(|g| can_adopt(&bucket.features[g.0], t))
        .copied()?;

    let (gene_id, gene_name) = {
        let g = &mut bucket.features[gene.0];
        if !g.children.contains(&id) {
            g.children.push(id);
        }
        if opts.transcripts_only && !opts.keep_genes {
            g.printable = false;
        }
        (g.id.clone(), g.attr("Name").map(str::to_string))
    };
    bucket.tdata.entry(id).or_default();

    let t = &mut bucket.features[id.0];
    t.parent = Some(gene);
    t.parent_id = Some(gene_id.clone());
    if opts.transcripts_only && !opts.keep_genes {
        // the gene will not be printed, keep its name and ID on the transcript
        if let Some(name) = gene_name.filter(|_| t.attr("Name").is_none()) {
            t.add_attr("Name", &name);
            if t.attr("gene_name").is_none() {
                t.add_attr("gene_name", &name);
            }
        }
        t.add_attr("geneID", &gene_id);
    }
    Some(gene)
}
