//! Column state with last-writer-wins reconciliation.
//!
//! A [`ColumnFamily`] maps column names to [`Column`]s. Each column carries
//! either a live byte value or a [`ColumnValue::Tombstone`] deletion marker,
//! plus the timestamp of the write that produced it. Reconciliation between
//! two variants of the same column is a pure function of the two variants,
//! which is what makes family-level merge commutative and associative.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The payload of one column: a live value or a deletion marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnValue {
    /// A live byte value.
    Live(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Tombstone marker for a deleted column.
    Tombstone,
}

/// One column variant as written by some replica: payload plus timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    value: ColumnValue,
    timestamp: i64,
}

impl Column {
    /// A live column written at `timestamp`.
    pub fn live(value: impl Into<Vec<u8>>, timestamp: i64) -> Self {
        Self {
            value: ColumnValue::Live(value.into()),
            timestamp,
        }
    }

    /// A deletion marker written at `timestamp`.
    pub fn tombstone(timestamp: i64) -> Self {
        Self {
            value: ColumnValue::Tombstone,
            timestamp,
        }
    }

    /// The column's payload.
    pub fn value(&self) -> &ColumnValue {
        &self.value
    }

    /// The write timestamp of this variant.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns true if this variant is a deletion marker.
    pub fn is_tombstone(&self) -> bool {
        matches!(self.value, ColumnValue::Tombstone)
    }

    /// Last-writer-wins reconciliation: does this variant win over `other`?
    ///
    /// A strictly greater timestamp always wins. On a timestamp tie the
    /// tie-break depends only on the two payloads, never on argument order:
    /// a tombstone beats a live value, and two live values compare bytewise
    /// with the greater winning. Equal variants do not supersede each other.
    pub fn supersedes(&self, other: &Column) -> bool {
        match self.timestamp.cmp(&other.timestamp) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match (&self.value, &other.value) {
                (ColumnValue::Tombstone, ColumnValue::Live(_)) => true,
                (ColumnValue::Live(_), ColumnValue::Tombstone) => false,
                (ColumnValue::Live(a), ColumnValue::Live(b)) => a > b,
                (ColumnValue::Tombstone, ColumnValue::Tombstone) => false,
            },
        }
    }
}

/// A named collection of columns, the unit the resolver merges and diffs.
///
/// Backed by a `BTreeMap` so iteration order (and therefore row digests)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamily {
    columns: BTreeMap<String, Column>,
}

impl ColumnFamily {
    /// Create an empty column family.
    pub fn new() -> Self {
        Self {
            columns: BTreeMap::new(),
        }
    }

    /// Set a column, replacing any previous variant unconditionally.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> &mut Self {
        self.columns.insert(name.into(), column);
        self
    }

    /// Get a column by name.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Iterate over all columns in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Column)> {
        self.columns.iter()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the family has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Merge another family into this one, producing the combined family.
    ///
    /// The result's column set is the union of both inputs. For a column
    /// present on both sides the winner is decided by [`Column::supersedes`],
    /// so the result's timestamp for every column is the maximum observed
    /// for that column across the inputs.
    pub fn merge(&self, other: &ColumnFamily) -> ColumnFamily {
        let mut merged = self.columns.clone();
        for (name, theirs) in &other.columns {
            match merged.get(name) {
                Some(ours) if !theirs.supersedes(ours) => {}
                _ => {
                    merged.insert(name.clone(), theirs.clone());
                }
            }
        }
        ColumnFamily { columns: merged }
    }

    /// Compute the columns `canonical` carries that this family lacks or
    /// holds a superseded variant of.
    ///
    /// `canonical` must dominate this family. Returns `None` when there is
    /// no difference.
    pub fn diff(&self, canonical: &ColumnFamily) -> Option<ColumnFamily> {
        let mut delta = BTreeMap::new();
        for (name, theirs) in &canonical.columns {
            match self.columns.get(name) {
                Some(ours) if ours == theirs => {}
                _ => {
                    delta.insert(name.clone(), theirs.clone());
                }
            }
        }
        if delta.is_empty() {
            None
        } else {
            Some(ColumnFamily { columns: delta })
        }
    }
}

impl From<BTreeMap<String, Column>> for ColumnFamily {
    fn from(columns: BTreeMap<String, Column>) -> Self {
        Self { columns }
    }
}

impl From<ColumnFamily> for BTreeMap<String, Column> {
    fn from(family: ColumnFamily) -> Self {
        family.columns
    }
}

impl FromIterator<(String, Column)> for ColumnFamily {
    fn from_iter<I: IntoIterator<Item = (String, Column)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
