//! Error types for row operations.

use thiserror::Error;

/// Structured error types for row merge and diff operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RowError {
    /// Attempted to merge rows belonging to different keys.
    #[error("cannot merge rows with different keys: {left} vs {right}")]
    KeyMismatch { left: String, right: String },
}

impl RowError {
    /// Check if this error is related to merge operations.
    pub fn is_merge_error(&self) -> bool {
        matches!(self, RowError::KeyMismatch { .. })
    }
}

// Conversion from RowError to the main Error type
impl From<RowError> for crate::Error {
    fn from(err: RowError) -> Self {
        crate::Error::Row(err)
    }
}
