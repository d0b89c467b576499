//! Config snapshots: immutable, generation-tagged copies of the full
//! routing table.
//!
//! A snapshot is produced wholesale by the control plane every time any
//! broker or trigger changes, and is never mutated in place once published.
//! Each change yields a brand-new snapshot with a strictly greater
//! generation; superseded snapshots are discarded, not merged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::broker::Broker;
use crate::error::{RouteWireError, ValidationError};
use crate::filter::Attributes;

/// Serde shape of a snapshot; the broker index is rebuilt on deserialize.
#[derive(Serialize, Deserialize)]
struct SnapshotParts {
    generation: u64,
    brokers: Vec<Broker>,
}

/// The complete routing table at one generation.
///
/// Broker identifiers are unique within a snapshot (enforced at
/// construction). The snapshot is immutable: consumers swap whole snapshots,
/// never individual brokers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SnapshotParts", into = "SnapshotParts")]
pub struct ConfigSnapshot {
    generation: u64,
    brokers: Vec<Broker>,
    index: HashMap<String, usize>,
}

impl ConfigSnapshot {
    /// Creates a snapshot, validating broker identifier uniqueness.
    ///
    /// # Errors
    /// `DuplicateBrokerId` if two brokers share an identifier.
    pub fn new(generation: u64, brokers: Vec<Broker>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(brokers.len());
        for (pos, broker) in brokers.iter().enumerate() {
            if index.insert(broker.id().to_string(), pos).is_some() {
                return Err(ValidationError::DuplicateBrokerId {
                    broker: broker.id().to_string(),
                });
            }
        }
        Ok(Self {
            generation,
            brokers,
            index,
        })
    }

    /// Creates a snapshot from brokers whose identifiers are already known
    /// to be unique (the builder maintains that invariant itself).
    pub(crate) fn from_validated(generation: u64, brokers: Vec<Broker>) -> Self {
        let index = brokers
            .iter()
            .enumerate()
            .map(|(pos, b)| (b.id().to_string(), pos))
            .collect();
        Self {
            generation,
            brokers,
            index,
        }
    }

    /// An empty snapshot at generation zero, the conventional state before
    /// the first publish.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_validated(0, Vec::new())
    }

    /// Generation counter distinguishing successive snapshots. Strictly
    /// increases between any two snapshots observed in sequence.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All brokers, in their original (serialization) order.
    #[must_use]
    pub fn brokers(&self) -> &[Broker] {
        &self.brokers
    }

    /// Looks up a broker by identifier.
    #[must_use]
    pub fn broker(&self, id: &str) -> Option<&Broker> {
        self.index.get(id).map(|&pos| &self.brokers[pos])
    }

    /// Number of brokers in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.brokers.len()
    }

    /// Returns true if the snapshot contains no brokers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brokers.is_empty()
    }

    /// Resolves destinations for an event against one broker's triggers.
    ///
    /// Returns `None` for an unknown broker identifier; a known broker with
    /// zero matching triggers yields `Some` empty vector.
    #[must_use]
    pub fn route(&self, broker_id: &str, attributes: &Attributes) -> Option<Vec<&str>> {
        self.broker(broker_id).map(|b| b.route(attributes))
    }

    /// Serializes the snapshot to pretty JSON, for debugging and operator
    /// tooling. The wire format for distribution is [`crate::wire`].
    pub fn to_json_pretty(&self) -> Result<String, RouteWireError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RouteWireError::internal(format!("serialize snapshot: {e}")))
    }

    /// Deserializes a snapshot from JSON produced by
    /// [`ConfigSnapshot::to_json_pretty`].
    pub fn from_json(s: &str) -> Result<Self, RouteWireError> {
        serde_json::from_str(s)
            .map_err(|e| RouteWireError::internal(format!("deserialize snapshot: {e}")))
    }
}

impl PartialEq for ConfigSnapshot {
    fn eq(&self, other: &Self) -> bool {
        // The index is derived from the brokers.
        self.generation == other.generation && self.brokers == other.brokers
    }
}

impl Eq for ConfigSnapshot {}

impl TryFrom<SnapshotParts> for ConfigSnapshot {
    type Error = ValidationError;

    fn try_from(parts: SnapshotParts) -> Result<Self, Self::Error> {
        Self::new(parts.generation, parts.brokers)
    }
}

impl From<ConfigSnapshot> for SnapshotParts {
    fn from(snapshot: ConfigSnapshot) -> Self {
        Self {
            generation: snapshot.generation,
            brokers: snapshot.brokers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::AttributeFilter;
    use crate::trigger::Trigger;

    fn broker(id: &str) -> Broker {
        Broker::new(id, "topic-1", "ns", id)
            .unwrap()
            .with_trigger(
                Trigger::new("t1", AttributeFilter::new().with("type", "foo"), "d1").unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn rejects_duplicate_broker_ids() {
        let err = ConfigSnapshot::new(1, vec![broker("b1"), broker("b1")]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateBrokerId {
                broker: "b1".to_string()
            }
        );
    }

    #[test]
    fn broker_lookup_by_id() {
        let snapshot = ConfigSnapshot::new(1, vec![broker("b1"), broker("b2")]).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.broker("b2").map(Broker::id), Some("b2"));
        assert!(snapshot.broker("b3").is_none());
    }

    #[test]
    fn route_distinguishes_unknown_broker_from_no_match() {
        let snapshot = ConfigSnapshot::new(1, vec![broker("b1")]).unwrap();

        let mut attributes = Attributes::new();
        attributes.insert("type".to_string(), "bar".to_string());
        assert_eq!(snapshot.route("b1", &attributes), Some(Vec::new()));
        assert_eq!(snapshot.route("nope", &attributes), None);
    }

    #[test]
    fn json_roundtrip_rebuilds_the_index() {
        let snapshot = ConfigSnapshot::new(5, vec![broker("b1"), broker("b2")]).unwrap();
        let json = snapshot.to_json_pretty().unwrap();
        let decoded = ConfigSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, decoded);
        assert_eq!(decoded.broker("b2").map(Broker::id), Some("b2"));
    }

    #[test]
    fn json_with_duplicate_brokers_is_rejected() {
        let forged = ConfigSnapshot::new(5, vec![broker("b1"), broker("b2")])
            .unwrap()
            .to_json_pretty()
            .unwrap()
            .replace("b2", "b1");
        assert!(ConfigSnapshot::from_json(&forged).is_err());
    }

    #[test]
    fn empty_snapshot_is_generation_zero() {
        let snapshot = ConfigSnapshot::empty();
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.is_empty());
    }
}
