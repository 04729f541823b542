//! Replica rows and the merge/diff primitives the resolver is built on.
//!
//! A [`Row`] is one replica's view of a keyed record: a [`ColumnFamily`] of
//! named columns, each carrying a value (or tombstone) and a timestamp.
//! Rows from different replicas for the *same* key are mergeable with
//! last-writer-wins semantics; [`Row::diff`] then recovers the minimal
//! column set a stale replica needs to catch up.

pub mod column;
pub mod digest;
pub mod errors;


pub use column::{Column, ColumnFamily, ColumnValue};
pub use digest::Digest;
pub use errors::RowError;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::Result;

/// One replica's state for a single keyed record.
///
/// Rows are immutable once received; merging two rows produces a fresh row
/// rather than mutating either input.
///
/// # Merge semantics
///
/// [`Row::merge`] is commutative and associative: any merge order over the
/// same set of same-key rows yields an identical result. Per column the
/// variant with the strictly greater timestamp wins; timestamp ties break
/// deterministically (see [`Column::supersedes`]). Merging rows with
/// different keys is a contract violation and fails with
/// [`RowError::KeyMismatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    key: String,
    columns: ColumnFamily,
}

impl Row {
    /// Create a row for `key` with the given column state.
    pub fn new(key: impl Into<String>, columns: ColumnFamily) -> Self {
        Self {
            key: key.into(),
            columns,
        }
    }

    /// The row's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The row's column state.
    pub fn columns(&self) -> &ColumnFamily {
        &self.columns
    }

    /// Merge another same-key row into this one, producing the combined row.
    ///
    /// The result's column set is the union of both inputs; for every column
    /// the result carries the winning variant under last-writer-wins.
    pub fn merge(&self, other: &Row) -> Result<Row> {
        if self.key != other.key {
            return Err(RowError::KeyMismatch {
                left: self.key.clone(),
                right: other.key.clone(),
            }
            .into());
        }
        Ok(Row {
            key: self.key.clone(),
            columns: self.columns.merge(&other.columns),
        })
    }

    /// Compute the columns this row lacks relative to `canonical`.
    ///
    /// `canonical` must dominate this row (it is the output of merging a set
    /// of rows that included this one). Returns `None` when the rows are
    /// already identical, i.e. the replica that sent this row is current.
    ///
    /// Re-applying the returned delta to this row via [`Row::merge`] yields
    /// a row equal to `canonical`.
    pub fn diff(&self, canonical: &Row) -> Option<ColumnFamily> {
        self.columns.diff(&canonical.columns)
    }

    /// Compute the digest of this row's effective state.
    ///
    /// Two rows with identical key and column state produce identical
    /// digests. Columns are hashed in sorted name order with explicit length
    /// framing, so the digest does not depend on insertion order or on any
    /// serialization format.
    pub fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update((self.key.len() as u64).to_le_bytes());
        hasher.update(self.key.as_bytes());
        for (name, column) in self.columns.iter() {
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hasher.update(column.timestamp().to_le_bytes());
            match column.value() {
                ColumnValue::Live(bytes) => {
                    hasher.update([0u8]);
                    hasher.update((bytes.len() as u64).to_le_bytes());
                    hasher.update(bytes);
                }
                ColumnValue::Tombstone => {
                    hasher.update([1u8]);
                }
            }
        }
        Digest::from(<[u8; 32]>::from(hasher.finalize()))
    }
}
