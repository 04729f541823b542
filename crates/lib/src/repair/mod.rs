//! Read-repair dispatch.
//!
//! The resolver does not execute repairs; it hands each stale replica's
//! delta to an injected [`RepairScheduler`] and moves on. Scheduling is
//! fire-and-forget: the resolver never awaits completion, never retries,
//! and a scheduler failure never affects the resolve result.

use std::net::SocketAddr;
#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::row::ColumnFamily;

/// A corrective update for one stale replica's row.
///
/// Scoped to the keyspace the resolver was configured with; applying the
/// carried columns on the destination replica (under the same
/// last-writer-wins rule) brings its row up to the canonical merged state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMutation {
    keyspace: String,
    key: String,
    columns: ColumnFamily,
}

impl RowMutation {
    /// Create a mutation for `key` in `keyspace` carrying `columns`.
    pub fn new(
        keyspace: impl Into<String>,
        key: impl Into<String>,
        columns: ColumnFamily,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            key: key.into(),
            columns,
        }
    }

    /// The keyspace this mutation targets.
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// The row key this mutation targets.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The columns to apply.
    pub fn columns(&self) -> &ColumnFamily {
        &self.columns
    }
}

/// A repair queued for delivery: the stale replica plus its mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairTask {
    /// The replica whose row is behind the canonical state.
    pub destination: SocketAddr,
    /// The corrective update to apply there.
    pub mutation: RowMutation,
}

/// Collaborator that carries corrective mutations to stale replicas.
///
/// Implementations must be non-blocking and safe under concurrent calls
/// from many in-flight resolutions. The resolver calls [`schedule`]
/// once per stale replica and never again for the same resolution.
///
/// [`schedule`]: RepairScheduler::schedule
pub trait RepairScheduler: Send + Sync {
    /// Queue `mutation` for delivery to `destination`.
    fn schedule(&self, destination: SocketAddr, mutation: RowMutation);
}

/// A scheduler that drops every repair on the floor.
///
/// Useful for read paths that want reconciliation without repair, and as a
/// default collaborator in examples.
#[derive(Debug, Default, Clone)]
pub struct NoopScheduler;

impl RepairScheduler for NoopScheduler {
    fn schedule(&self, _destination: SocketAddr, _mutation: RowMutation) {}
}

/// A scheduler that forwards repairs onto a tokio channel.
///
/// The receiving half is owned by whatever background task actually delivers
/// mutations to replicas. Sending never blocks; if the receiver has gone
/// away the repair is dropped with a warning, since repair delivery is
/// best-effort by contract.
#[derive(Debug, Clone)]
pub struct ChannelScheduler {
    tx: mpsc::UnboundedSender<RepairTask>,
}

impl ChannelScheduler {
    /// Create a scheduler and the receiver its repairs arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RepairTask>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RepairScheduler for ChannelScheduler {
    fn schedule(&self, destination: SocketAddr, mutation: RowMutation) {
        let task = RepairTask {
            destination,
            mutation,
        };
        if self.tx.send(task).is_err() {
            warn!(%destination, "repair channel closed, dropping repair task");
        }
    }
}

/// A scheduler that records every task it is handed, for assertions in tests.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    tasks: Mutex<Vec<RepairTask>>,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingScheduler {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tasks scheduled so far, in order.
    pub fn tasks(&self) -> Vec<RepairTask> {
        self.tasks.lock().unwrap().clone()
    }
}

#[cfg(any(test, feature = "testing"))]
impl RepairScheduler for RecordingScheduler {
    fn schedule(&self, destination: SocketAddr, mutation: RowMutation) {
        self.tasks.lock().unwrap().push(RepairTask {
            destination,
            mutation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Column;

    fn mutation() -> RowMutation {
        let mut columns = ColumnFamily::new();
        columns.insert("c1", Column::live(b"v1".to_vec(), 10));
        RowMutation::new("ks", "k1", columns)
    }

    #[test]
    fn test_channel_scheduler_delivers_tasks() {
        let (scheduler, mut rx) = ChannelScheduler::new();
        let dest: SocketAddr = "10.0.0.2:7000".parse().unwrap();

        scheduler.schedule(dest, mutation());

        let task = rx.try_recv().unwrap();
        assert_eq!(task.destination, dest);
        assert_eq!(task.mutation, mutation());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_scheduler_survives_dropped_receiver() {
        let (scheduler, rx) = ChannelScheduler::new();
        drop(rx);
        // Must not panic; repair delivery is best-effort.
        scheduler.schedule("10.0.0.2:7000".parse().unwrap(), mutation());
    }

    #[test]
    fn test_recording_scheduler_keeps_order() {
        let scheduler = RecordingScheduler::new();
        let a: SocketAddr = "10.0.0.2:7000".parse().unwrap();
        let b: SocketAddr = "10.0.0.3:7000".parse().unwrap();

        scheduler.schedule(a, mutation());
        scheduler.schedule(b, mutation());

        let tasks = scheduler.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].destination, a);
        assert_eq!(tasks[1].destination, b);
    }
}
