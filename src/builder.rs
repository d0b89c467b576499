//! Snapshot build and publish: the producer side of the distribution
//! protocol.
//!
//! The control plane rebuilds the whole routing table whenever any broker or
//! trigger definition changes. There is no incremental update format: every
//! publish re-serializes the entire table, a simplicity-over-bandwidth
//! tradeoff appropriate to routing tables that are small relative to their
//! update frequency.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::admission::BrokerResource;
use crate::broker::Broker;
use crate::error::ValidationError;
use crate::filter::AttributeFilter;
use crate::snapshot::ConfigSnapshot;
use crate::trigger::Trigger;

/// One entity excluded from a built snapshot, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Identifier of the broker the entity belongs to (or is).
    pub broker: String,
    /// Why the entity was excluded.
    pub error: ValidationError,
}

/// The outcome of one build: the snapshot that will be published plus every
/// entity that had to be excluded from it.
///
/// Offending entities are excluded and reported, never silently dropped,
/// and never allowed to violate the snapshot's uniqueness invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// The built snapshot. Always satisfies the schema invariants.
    pub snapshot: ConfigSnapshot,
    /// Entities excluded from the snapshot, in encounter order.
    pub rejected: Vec<Rejection>,
}

impl BuildReport {
    /// Returns true if every definition made it into the snapshot.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Builds a snapshot at `generation` from the current full set of broker
/// definitions.
///
/// Invalid entities (empty destination or identifier, empty topic, duplicate
/// identifiers) are excluded from the snapshot and reported in the returned
/// [`BuildReport`].
#[must_use]
pub fn build(generation: u64, definitions: &[BrokerResource]) -> BuildReport {
    let mut brokers: Vec<Broker> = Vec::with_capacity(definitions.len());
    let mut rejected = Vec::new();

    for def in definitions {
        if brokers.iter().any(|b| b.id() == def.id) {
            rejected.push(Rejection {
                broker: def.id.clone(),
                error: ValidationError::DuplicateBrokerId {
                    broker: def.id.clone(),
                },
            });
            continue;
        }

        if let Some(broker) = lower_broker(def, &mut rejected) {
            brokers.push(broker);
        }
    }

    if !rejected.is_empty() {
        tracing::warn!(
            generation,
            rejected = rejected.len(),
            "excluded invalid entities from snapshot"
        );
    }
    tracing::debug!(generation, brokers = brokers.len(), "built snapshot");

    BuildReport {
        snapshot: ConfigSnapshot::from_validated(generation, brokers),
        rejected,
    }
}

/// Lowers one broker definition into the routing table, excluding invalid
/// triggers individually rather than dropping the whole broker.
fn lower_broker(def: &BrokerResource, rejected: &mut Vec<Rejection>) -> Option<Broker> {
    let mut broker = match Broker::new(&def.id, &def.spec.topic, &def.namespace, &def.name) {
        Ok(broker) => broker,
        Err(error) => {
            rejected.push(Rejection {
                broker: def.id.clone(),
                error,
            });
            return None;
        }
    };

    if let Some(sink) = &def.spec.dead_letter_sink {
        broker = broker.with_dead_letter_sink(sink.clone());
    }

    for trigger_def in &def.spec.triggers {
        let filter = AttributeFilter::from(trigger_def.attributes.clone());
        let trigger = match Trigger::new(&trigger_def.id, filter, &trigger_def.destination) {
            Ok(trigger) => trigger,
            Err(error) => {
                rejected.push(Rejection {
                    broker: def.id.clone(),
                    error,
                });
                continue;
            }
        };
        if let Err(error) = broker.push_trigger(trigger) {
            rejected.push(Rejection {
                broker: def.id.clone(),
                error,
            });
        }
    }

    Some(broker)
}

/// The producer's generation counter.
///
/// Every publish yields a snapshot whose generation is strictly greater than
/// the previous publish. Generations count publish attempts, not consumer
/// acknowledgments, so the counter advances even when nobody observed the
/// previous snapshot.
#[derive(Debug)]
pub struct SnapshotPublisher {
    last_published: AtomicU64,
}

impl SnapshotPublisher {
    /// Creates a publisher whose first publish carries generation 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Creates a publisher that resumes after a known generation (for a
    /// control plane recovering its counter from durable state).
    #[must_use]
    pub fn starting_after(last_published: u64) -> Self {
        Self {
            last_published: AtomicU64::new(last_published),
        }
    }

    /// Generation of the most recent publish, 0 before the first.
    #[must_use]
    pub fn last_generation(&self) -> u64 {
        self.last_published.load(Ordering::Acquire)
    }

    /// Builds and stamps the next snapshot from the current full set of
    /// broker definitions.
    pub fn publish(&self, definitions: &[BrokerResource]) -> BuildReport {
        let generation = self.last_published.fetch_add(1, Ordering::AcqRel) + 1;
        let report = build(generation, definitions);
        tracing::info!(
            generation,
            brokers = report.snapshot.len(),
            rejected = report.rejected.len(),
            "published snapshot"
        );
        report
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}
