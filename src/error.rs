//! Error types for gfloci.
//!
//! Only caller/integration bugs are errors. Records that merely fail to
//! qualify for clustering are reported through ordinary `false`/`None` results.

use thiserror::Error;

/// Result type alias for clustering operations.
pub type Result<T> = std::result::Result<T, LocusError>;

/// Fatal usage errors raised by the clustering core.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocusError {
    /// A single-exon transcript was required but a multi-exon one was given
    #[error("bad single-exon containment call: '{id}' has {exons} exons")]
    NotSingleExon {
        /// Identifier of the offending transcript
        id: String,
        /// Its exon count
        exons: usize,
    },

    /// A feature handle does not belong to the bucket it was used with
    #[error("feature {id} is not registered in reference sequence '{seqid}'")]
    UnknownFeature {
        /// The handle, formatted
        id: String,
        /// The bucket's reference sequence name
        seqid: String,
    },

    /// Invalid option value
    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The option name
        parameter: String,
        /// Why it was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LocusError::NotSingleExon {
            id: "T1".to_string(),
            exons: 3,
        };
        assert_eq!(
            err.to_string(),
            "bad single-exon containment call: 'T1' has 3 exons"
        );

        let err = LocusError::UnknownFeature {
            id: "#7".to_string(),
            seqid: "chr2".to_string(),
        };
        assert!(err.to_string().contains("chr2"));
    }
}
