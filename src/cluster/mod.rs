//! Incremental locus clustering.

pub mod adoption;
pub mod bucket;
pub mod index;
pub mod locus;
pub mod stats;

pub use adoption::adopt_orphan;
pub use bucket::RefSeqBucket;
pub use index::{find_insertion_point, insert_locus, reposition_locus};
pub use locus::Locus;
pub use stats::{collect_bucket_stats, collect_locus_data, number_loci};
