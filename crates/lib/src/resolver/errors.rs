//! Error types for quorum read resolution.

use thiserror::Error;

use crate::row::Digest;

/// Structured error types for digest verification during resolve.
///
/// Either variant means the read is inconclusive: the caller is expected to
/// fall back to a full-data read across more replicas rather than trusting
/// any single replica's content.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A data-bearing row's digest disagrees with the digest-only value the
    /// other replicas reported.
    #[error("digest mismatch for key {key} ({computed} vs {reported})")]
    DigestMismatch {
        key: String,
        /// Digest computed from the data-bearing row.
        computed: Digest,
        /// Digest reported by the digest-only responses.
        reported: Digest,
    },

    /// Two digest-only responses disagree with each other (strict mode).
    #[error("digest-only responses disagree ({first} vs {second})")]
    DigestDisagreement { first: Digest, second: Digest },
}

impl ResolveError {
    /// Check if this error is a digest verification failure.
    pub fn is_digest_mismatch(&self) -> bool {
        matches!(
            self,
            ResolveError::DigestMismatch { .. } | ResolveError::DigestDisagreement { .. }
        )
    }
}

// Conversion from ResolveError to the main Error type
impl From<ResolveError> for crate::Error {
    fn from(err: ResolveError) -> Self {
        crate::Error::Resolve(err)
    }
}
