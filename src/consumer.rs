//! Snapshot reload: the consumer side of the distribution protocol.
//!
//! Each consumer process holds one [`SnapshotCache`]. Route-resolution
//! callers load the current snapshot without locks; reloads replace the
//! table with a single atomic pointer swap, so a caller either sees the old
//! table or the new one in full, never a mix of generations.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;

use crate::error::DecodeError;
use crate::filter::Attributes;
use crate::snapshot::ConfigSnapshot;
use crate::wire;

/// The reload state machine's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No snapshot observed yet; the first one is adopted unconditionally.
    Uninitialized,
    /// Serving the snapshot with this generation.
    Synced(u64),
}

/// The outcome of offering one snapshot to a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The snapshot was newer and is now the serving table.
    Applied {
        /// Generation before the swap, `None` from `Uninitialized`.
        previous: Option<u64>,
        /// Generation now being served.
        current: u64,
    },
    /// The snapshot was stale or a duplicate and was discarded. Not an
    /// error: expected under at-least-once delivery of updates.
    Stale {
        /// Generation of the discarded snapshot.
        observed: u64,
        /// Generation still being served.
        current: u64,
    },
}

impl ApplyOutcome {
    /// Returns true if the offered snapshot became the serving table.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// A consumer's routing table: the last-applied snapshot behind an atomic
/// pointer.
///
/// Reads are lock-free and may run concurrently from any number of threads;
/// a loaded `Arc` pins one generation for as long as the caller holds it.
/// Reloads serialize on a mutex that readers never touch.
#[derive(Debug)]
pub struct SnapshotCache {
    table: ArcSwapOption<ConfigSnapshot>,
    reload: Mutex<()>,
}

impl SnapshotCache {
    /// Creates a cache in the `Uninitialized` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: ArcSwapOption::empty(),
            reload: Mutex::new(()),
        }
    }

    /// The current reload state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        match self.generation() {
            None => SyncState::Uninitialized,
            Some(g) => SyncState::Synced(g),
        }
    }

    /// Generation of the serving snapshot, `None` while uninitialized.
    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        self.table.load().as_ref().map(|s| s.generation())
    }

    /// Loads the serving snapshot. Lock-free; the returned `Arc` stays
    /// valid (and internally consistent) across concurrent reloads.
    #[must_use]
    pub fn current(&self) -> Option<Arc<ConfigSnapshot>> {
        self.table.load_full()
    }

    /// Offers a snapshot to the cache.
    ///
    /// Adopted unconditionally from `Uninitialized`; otherwise adopted iff
    /// its generation is strictly greater than the serving one. A stale or
    /// duplicate snapshot is discarded silently and the cache never
    /// regresses. The swap itself is one atomic pointer store.
    pub fn apply(&self, snapshot: Arc<ConfigSnapshot>) -> ApplyOutcome {
        // Serialize reloads; readers load the pointer directly and are
        // unaffected by this lock.
        let _reload = self.reload.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.table.load();
        if let Some(existing) = current.as_ref() {
            if snapshot.generation() <= existing.generation() {
                tracing::debug!(
                    observed = snapshot.generation(),
                    current = existing.generation(),
                    "discarding stale snapshot"
                );
                return ApplyOutcome::Stale {
                    observed: snapshot.generation(),
                    current: existing.generation(),
                };
            }
        }

        let previous = current.as_ref().map(|s| s.generation());
        let generation = snapshot.generation();
        self.table.store(Some(snapshot));

        tracing::info!(?previous, current = generation, "applied snapshot");
        ApplyOutcome::Applied {
            previous,
            current: generation,
        }
    }

    /// Decodes snapshot bytes received from the transport and offers the
    /// result to the cache.
    ///
    /// # Errors
    /// `DecodeError` if the bytes are malformed or violate the schema
    /// invariants; the last-good snapshot keeps serving in that case. The
    /// update is rejected whole, never partially applied.
    pub fn apply_encoded(&self, bytes: &[u8]) -> Result<ApplyOutcome, DecodeError> {
        let snapshot = wire::decode_snapshot(bytes).map_err(|e| {
            tracing::warn!(error = %e, "rejected malformed snapshot, keeping last-good table");
            e
        })?;
        Ok(self.apply(Arc::new(snapshot)))
    }

    /// Resolves destinations for an event against the serving snapshot.
    ///
    /// Returns `None` while uninitialized or for an unknown broker
    /// identifier. The whole resolution runs against a single generation.
    #[must_use]
    pub fn route(&self, broker_id: &str, attributes: &Attributes) -> Option<Vec<String>> {
        let snapshot = self.current()?;
        let destinations = snapshot.route(broker_id, attributes)?;
        Some(destinations.into_iter().map(str::to_string).collect())
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
