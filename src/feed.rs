//! In-process snapshot fan-out.
//!
//! A reference transport for composing producer and consumers inside one
//! process (and for tests): published snapshots are broadcast over bounded
//! channels, one per subscriber. Delivery is best-effort `try_send`; a slow
//! subscriber may miss intermediate generations, which is tolerable since
//! every snapshot carries the full table and the reload state machine
//! converges on the maximum generation it observes. Real transports (a
//! configuration store, a broadcast channel) live outside this crate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::consumer::SnapshotCache;
use crate::snapshot::ConfigSnapshot;

/// Default per-subscriber buffer capacity.
const DEFAULT_CAPACITY: usize = 16;

/// Fans published snapshots out to subscribed consumers.
#[derive(Debug)]
pub struct SnapshotFeed {
    subscribers: Mutex<Vec<Sender<Arc<ConfigSnapshot>>>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl SnapshotFeed {
    /// Creates a feed with the default per-subscriber buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a feed whose subscriber buffers hold `capacity` snapshots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Registers a new subscriber. The subscription only sees snapshots
    /// broadcast after this call; a late joiner catches up on the next
    /// publish.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotSubscription {
        let (tx, rx) = bounded(self.capacity);
        self.lock_subscribers().push(tx);
        SnapshotSubscription { rx }
    }

    /// Broadcasts a snapshot to every live subscriber, returning how many
    /// received it. Never blocks: full subscriber buffers drop the snapshot
    /// (counted in [`SnapshotFeed::dropped`]); disconnected subscribers are
    /// pruned.
    pub fn broadcast(&self, snapshot: &Arc<ConfigSnapshot>) -> usize {
        let mut delivered = 0;
        self.lock_subscribers().retain(|tx| {
            match tx.try_send(Arc::clone(snapshot)) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
        delivered
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// Snapshots dropped because a subscriber's buffer was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Arc<ConfigSnapshot>>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SnapshotFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the feed.
#[derive(Debug)]
pub struct SnapshotSubscription {
    rx: Receiver<Arc<ConfigSnapshot>>,
}

impl SnapshotSubscription {
    /// Blocks until the next snapshot arrives, or returns `None` once the
    /// feed is gone.
    #[must_use]
    pub fn recv(&self) -> Option<Arc<ConfigSnapshot>> {
        self.rx.recv().ok()
    }

    /// Returns the next queued snapshot without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<Arc<ConfigSnapshot>> {
        self.rx.try_recv().ok()
    }

    /// Drains every queued snapshot into a cache, returning how many were
    /// applied (stale ones are discarded by the cache, as usual).
    pub fn pump(&self, cache: &SnapshotCache) -> usize {
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => {
                    if cache.apply(snapshot).is_applied() {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return applied,
            }
        }
    }
}
