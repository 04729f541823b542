//! Quorum read resolution.
//!
//! The [`ReadResolver`] is invoked by the read coordinator once enough
//! replica responses have arrived for one logical read (how many is
//! "enough" is the coordinator's quorum policy, not ours). It classifies
//! the responses into digest-only and data-bearing, verifies that sampled
//! full rows agree with the reported digests, folds the data rows into the
//! canonical merged row, and schedules a corrective mutation for every
//! replica whose row is behind.
//!
//! The resolver is stateless apart from its construction-time configuration,
//! so one instance may serve any number of concurrent resolutions without
//! locking.

pub mod errors;


pub use errors::ResolveError;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::Result;
use crate::repair::{RepairScheduler, RowMutation};
use crate::response::{ReadResponse, ReplicaMessage, ResponseError};
use crate::row::{Digest, Row};

/// How digest-only responses are reconciled with each other before being
/// checked against data rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DigestMode {
    /// Retain only the last digest-only value observed; earlier ones are
    /// silently ignored even if they disagree. This reproduces the
    /// historical behavior of the read path.
    #[default]
    LastWins,
    /// Require all digest-only responses to agree with each other before
    /// any data row is checked; disagreement fails the resolve.
    Strict,
}

/// The outcome of a successful resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// Data was present; this is the canonical row merged across replicas.
    Merged(Row),
    /// No data-bearing response existed. Callers interpret this as "no
    /// confirmed data yet" or "row does not exist" depending on context.
    Absent,
}

impl ReadOutcome {
    /// Returns true if no data-bearing response existed.
    pub fn is_absent(&self) -> bool {
        matches!(self, ReadOutcome::Absent)
    }

    /// The merged row, if any.
    pub fn row(&self) -> Option<&Row> {
        match self {
            ReadOutcome::Merged(row) => Some(row),
            ReadOutcome::Absent => None,
        }
    }

    /// Consume the outcome, yielding the merged row if any.
    pub fn into_row(self) -> Option<Row> {
        match self {
            ReadOutcome::Merged(row) => Some(row),
            ReadOutcome::Absent => None,
        }
    }
}

/// The response set split into its digest and data halves.
///
/// Data rows stay paired with the address of the replica that sent them;
/// the delta calculator depends on that pairing to route repairs.
struct Classified {
    pairs: Vec<(SocketAddr, Row)>,
    digests: Vec<Digest>,
    failures: Vec<ResponseError>,
}

/// Split a response set into data rows (with origins), digest values, and
/// decode failures. A failure never aborts classification of the remaining
/// responses; whether it is fatal is the caller's decision.
fn classify(responses: &[ReplicaMessage]) -> Classified {
    let mut pairs = Vec::new();
    let mut digests = Vec::new();
    let mut failures = Vec::new();
    for message in responses {
        match message.decode() {
            Ok(ReadResponse::Data(row)) => pairs.push((message.origin(), row)),
            Ok(ReadResponse::Digest(digest)) => digests.push(digest),
            Err(err) => failures.push(err),
        }
    }
    Classified {
        pairs,
        digests,
        failures,
    }
}

type DurationObserver = dyn Fn(Duration) + Send + Sync;

/// Reconciles one read's replica responses into a canonical row and
/// schedules read repair for stale replicas.
///
/// Construction fixes the configuration: the keyspace repairs are scoped
/// to, the injected [`RepairScheduler`], the [`DigestMode`], and an
/// optional duration observer. Nothing else persists across calls.
pub struct ReadResolver {
    keyspace: String,
    scheduler: Arc<dyn RepairScheduler>,
    digest_mode: DigestMode,
    observer: Option<Arc<DurationObserver>>,
}

impl ReadResolver {
    /// Create a resolver for `keyspace`, dispatching repairs to `scheduler`.
    pub fn new(keyspace: impl Into<String>, scheduler: Arc<dyn RepairScheduler>) -> Self {
        Self {
            keyspace: keyspace.into(),
            scheduler,
            digest_mode: DigestMode::default(),
            observer: None,
        }
    }

    /// Select how disagreeing digest-only responses are handled.
    pub fn with_digest_mode(mut self, mode: DigestMode) -> Self {
        self.digest_mode = mode;
        self
    }

    /// Install a callback invoked with the elapsed duration of each
    /// completed resolve. Invoked at most once per call.
    pub fn with_observer(mut self, observer: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// The keyspace repairs are scoped to.
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Resolve one read's response set into its canonical row.
    ///
    /// Returns [`ReadOutcome::Absent`] when no response carried data (only
    /// digests, or an empty set). Otherwise merges the data rows with
    /// last-writer-wins semantics, schedules one repair per stale replica,
    /// and returns [`ReadOutcome::Merged`].
    ///
    /// Fails with a decode error if any response body was malformed, and
    /// with [`ResolveError::DigestMismatch`] if a data row disagrees with
    /// the digest the digest-only replicas reported; a mismatch means the
    /// read is inconclusive and the caller should fall back to a full-data
    /// read across more replicas. No merge or repair happens on failure.
    pub fn resolve(&self, responses: &[ReplicaMessage]) -> Result<ReadOutcome> {
        let start = Instant::now();
        let Classified {
            pairs,
            digests,
            mut failures,
        } = classify(responses);
        if !failures.is_empty() {
            return Err(failures.remove(0).into());
        }

        if self.digest_mode == DigestMode::Strict
            && let Some((first, rest)) = digests.split_first()
        {
            for other in rest {
                if other != first {
                    return Err(ResolveError::DigestDisagreement {
                        first: *first,
                        second: *other,
                    }
                    .into());
                }
            }
        }

        // Compare every data row against the reported digest. Vacuous when
        // no digest-only response was observed, or when only digests came
        // back (nothing to compare them against).
        if let Some(reported) = digests.last() {
            for (_, row) in &pairs {
                let computed = row.digest();
                if computed != *reported {
                    return Err(ResolveError::DigestMismatch {
                        key: row.key().to_string(),
                        computed,
                        reported: *reported,
                    }
                    .into());
                }
            }
        }

        if pairs.is_empty() {
            self.observe(start.elapsed(), 0, 0);
            return Ok(ReadOutcome::Absent);
        }

        // Left fold over the data rows; the per-column rule is commutative
        // and associative, so the fold order cannot change the result.
        let mut merged = pairs[0].1.clone();
        for (_, row) in &pairs[1..] {
            merged = merged.merge(row)?;
        }

        let mut repairs = 0usize;
        for (origin, row) in &pairs {
            if let Some(delta) = row.diff(&merged) {
                let mutation = RowMutation::new(&self.keyspace, merged.key(), delta);
                self.scheduler.schedule(*origin, mutation);
                repairs += 1;
            }
        }

        self.observe(start.elapsed(), pairs.len(), repairs);
        Ok(ReadOutcome::Merged(merged))
    }

    /// Check whether any response in the set carries actual row data.
    ///
    /// Side-effect free; used by coordinators deciding whether a second
    /// full-data round-trip is needed. A response that fails to decode is
    /// logged and counted as "not data", and never aborts evaluation of
    /// the remaining responses.
    pub fn is_data_present(&self, responses: &[ReplicaMessage]) -> bool {
        let mut present = false;
        for message in responses {
            match message.decode() {
                Ok(ReadResponse::Data(_)) => present = true,
                Ok(ReadResponse::Digest(_)) => {}
                Err(err) => {
                    warn!(from = %message.origin(), error = %err, "skipping undecodable response");
                }
            }
        }
        present
    }

    fn observe(&self, elapsed: Duration, rows: usize, repairs: usize) {
        debug!(
            elapsed_us = elapsed.as_micros() as u64,
            rows, repairs, "resolve complete"
        );
        if let Some(observer) = &self.observer {
            observer(elapsed);
        }
    }
}
