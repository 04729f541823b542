//!
//! Rowmend: read-side reconciliation for quorum-replicated row stores.
//!
//! When a read coordinator has collected enough replica responses for one
//! logical read, this library turns that response set into a single canonical
//! row and schedules the corrective updates stale replicas need.
//!
//! ## Core Concepts
//!
//! * **Rows (`row::Row`)**: A keyed record whose columns carry values,
//!   timestamps, and tombstones. Same-key rows from different replicas merge
//!   with last-writer-wins semantics.
//! * **Replica messages (`response::ReplicaMessage`)**: One transport message
//!   from one replica, carrying either full row data or only a digest of it.
//! * **Digests (`row::Digest`)**: A fixed-size fingerprint of a row's
//!   effective state, letting most replicas skip shipping full payloads.
//! * **The resolver (`resolver::ReadResolver`)**: Classifies responses,
//!   verifies digests against data, folds the data rows into a merged row,
//!   and hands per-replica deltas to a repair scheduler.
//! * **Repair (`repair::RepairScheduler`)**: The injected, fire-and-forget
//!   collaborator that carries corrective mutations back to stale replicas.

pub mod repair;
pub mod resolver;
pub mod response;
pub mod row;

/// Re-export the `ReadResolver` struct for easier access.
pub use resolver::ReadResolver;

/// Result type used throughout the Rowmend library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Rowmend library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured row errors from the row module
    #[error(transparent)]
    Row(row::RowError),

    /// Structured response errors from the response module
    #[error(transparent)]
    Response(response::ResponseError),

    /// Structured resolver errors from the resolver module
    #[error(transparent)]
    Resolve(resolver::ResolveError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Row(_) => "row",
            Error::Response(_) => "response",
            Error::Resolve(_) => "resolver",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a response payload that failed to decode.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::Response(response_err) => response_err.is_decode(),
            _ => false,
        }
    }

    /// Check if this error is a digest verification failure.
    pub fn is_digest_mismatch(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_digest_mismatch(),
            _ => false,
        }
    }

    /// Check if this error is a row merge failure.
    pub fn is_merge_error(&self) -> bool {
        match self {
            Error::Row(row_err) => row_err.is_merge_error(),
            _ => false,
        }
    }
}
