//! Wire format for serialized snapshots.
//!
//! Snapshots travel between the control plane and data planes as protobuf
//! messages. Field numbering is stable forever so that older consumers keep
//! decoding newer snapshots; unknown fields are ignored on decode, not
//! rejected. All optional/unknown-field handling lives here at the decode
//! boundary; domain types ([`crate::snapshot`], [`crate::broker`]) never
//! carry wire artifacts.
//!
//! Attribute maps use ordered maps and trigger/broker sequences keep their
//! input order, so encoding the same snapshot twice yields identical bytes.

use std::collections::BTreeMap;

use prost::Message;

use crate::error::DecodeError;
use crate::snapshot::ConfigSnapshot;

/// Wire shape of a trigger.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Trigger {
    /// Exact-match attribute requirements. Keys are compared with the
    /// equivalent keys in the event context; an event passes iff all values
    /// are equal. Only scalar string values are supported.
    #[prost(btree_map = "string, string", tag = "1")]
    pub attributes: BTreeMap<String, String>,
    /// Address receiving events that pass the filter.
    #[prost(string, tag = "2")]
    pub destination: String,
    /// Trigger identifier.
    #[prost(string, tag = "3")]
    pub id: String,
}

/// Wire shape of a broker.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Broker {
    /// Broker identifier.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Source topic to consume.
    #[prost(string, tag = "2")]
    pub topic: String,
    /// Dead-letter sink URI; empty means "none".
    #[prost(string, tag = "3")]
    pub dead_letter_sink: String,
    /// Triggers associated with the broker.
    #[prost(message, repeated, tag = "4")]
    pub triggers: Vec<Trigger>,
    /// Namespace of the owning resource.
    #[prost(string, tag = "5")]
    pub namespace: String,
    /// Name of the owning resource.
    #[prost(string, tag = "6")]
    pub name: String,
}

/// Wire shape of a full snapshot.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Brokers {
    /// The complete routing table.
    #[prost(message, repeated, tag = "1")]
    pub brokers: Vec<Broker>,
    /// Counts every published snapshot. Every data plane must converge on
    /// the same value for the same table.
    #[prost(uint64, tag = "2")]
    pub volume_generation: u64,
}

/// Encodes a snapshot into its wire bytes.
#[must_use]
pub fn encode_snapshot(snapshot: &ConfigSnapshot) -> Vec<u8> {
    Brokers::from(snapshot).encode_to_vec()
}

/// Decodes wire bytes into a snapshot, re-validating the schema invariants.
///
/// # Errors
/// - `Malformed` if the bytes do not decode into the wire schema
/// - `InvalidPayload` if the decoded payload carries an empty destination or
///   duplicate identifiers (a buggy producer); the whole update is rejected
pub fn decode_snapshot(bytes: &[u8]) -> Result<ConfigSnapshot, DecodeError> {
    let wire = Brokers::decode(bytes)?;
    ConfigSnapshot::try_from(wire)
}

impl From<&ConfigSnapshot> for Brokers {
    fn from(snapshot: &ConfigSnapshot) -> Self {
        Self {
            brokers: snapshot
                .brokers()
                .iter()
                .map(|broker| Broker {
                    id: broker.id().to_string(),
                    topic: broker.topic().to_string(),
                    dead_letter_sink: broker.dead_letter_sink().unwrap_or("").to_string(),
                    triggers: broker
                        .triggers()
                        .iter()
                        .map(|trigger| Trigger {
                            attributes: trigger
                                .filter()
                                .iter()
                                .map(|(k, v)| (k.to_string(), v.to_string()))
                                .collect(),
                            destination: trigger.destination().to_string(),
                            id: trigger.id().to_string(),
                        })
                        .collect(),
                    namespace: broker.namespace().to_string(),
                    name: broker.name().to_string(),
                })
                .collect(),
            volume_generation: snapshot.generation(),
        }
    }
}

impl TryFrom<Brokers> for ConfigSnapshot {
    type Error = DecodeError;

    fn try_from(wire: Brokers) -> Result<Self, Self::Error> {
        let mut brokers = Vec::with_capacity(wire.brokers.len());
        for wb in wire.brokers {
            let mut broker = crate::broker::Broker::new(wb.id, wb.topic, wb.namespace, wb.name)
                .map_err(DecodeError::InvalidPayload)?
                .with_dead_letter_sink(wb.dead_letter_sink);
            for wt in wb.triggers {
                let trigger = crate::trigger::Trigger::new(
                    wt.id,
                    crate::filter::AttributeFilter::from(wt.attributes),
                    wt.destination,
                )
                .map_err(DecodeError::InvalidPayload)?;
                broker
                    .push_trigger(trigger)
                    .map_err(DecodeError::InvalidPayload)?;
            }
            brokers.push(broker);
        }
        ConfigSnapshot::new(wire.volume_generation, brokers).map_err(DecodeError::InvalidPayload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::Broker as DomainBroker;
    use crate::error::ValidationError;
    use crate::filter::AttributeFilter;
    use crate::trigger::Trigger as DomainTrigger;

    fn sample_snapshot() -> ConfigSnapshot {
        let broker = DomainBroker::new("b1", "topic-1", "ns", "demo")
            .unwrap()
            .with_dead_letter_sink("http://dlq")
            .with_trigger(
                DomainTrigger::new(
                    "t1",
                    AttributeFilter::new().with("type", "foo").with("source", "x"),
                    "http://d1",
                )
                .unwrap(),
            )
            .unwrap();
        ConfigSnapshot::new(12, vec![broker]).unwrap()
    }

    #[test]
    fn roundtrip_reproduces_the_snapshot() {
        let snapshot = sample_snapshot();
        let bytes = encode_snapshot(&snapshot);
        let decoded = decode_snapshot(&bytes).unwrap();
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn encoding_is_deterministic() {
        let snapshot = sample_snapshot();
        assert_eq!(encode_snapshot(&snapshot), encode_snapshot(&snapshot));
    }

    #[test]
    fn empty_dead_letter_sink_decodes_to_none() {
        let wire = Brokers {
            brokers: vec![Broker {
                id: "b1".to_string(),
                topic: "topic-1".to_string(),
                dead_letter_sink: String::new(),
                triggers: Vec::new(),
                namespace: "ns".to_string(),
                name: "demo".to_string(),
            }],
            volume_generation: 1,
        };
        let snapshot = ConfigSnapshot::try_from(wire).unwrap();
        assert_eq!(snapshot.broker("b1").unwrap().dead_letter_sink(), None);
    }

    #[test]
    fn payload_with_empty_destination_is_rejected_whole() {
        let wire = Brokers {
            brokers: vec![Broker {
                id: "b1".to_string(),
                topic: "topic-1".to_string(),
                dead_letter_sink: String::new(),
                triggers: vec![Trigger {
                    attributes: BTreeMap::new(),
                    destination: String::new(),
                    id: "t1".to_string(),
                }],
                namespace: "ns".to_string(),
                name: "demo".to_string(),
            }],
            volume_generation: 1,
        };
        let err = ConfigSnapshot::try_from(wire).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidPayload(ValidationError::EmptyDestination { .. })
        ));
    }

    #[test]
    fn payload_with_duplicate_broker_ids_is_rejected_whole() {
        let make = |name: &str| Broker {
            id: "b1".to_string(),
            topic: "topic-1".to_string(),
            dead_letter_sink: String::new(),
            triggers: Vec::new(),
            namespace: "ns".to_string(),
            name: name.to_string(),
        };
        let wire = Brokers {
            brokers: vec![make("one"), make("two")],
            volume_generation: 1,
        };
        let err = ConfigSnapshot::try_from(wire).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidPayload(ValidationError::DuplicateBrokerId { .. })
        ));
    }

    #[test]
    fn truncated_bytes_are_malformed() {
        let bytes = encode_snapshot(&sample_snapshot());
        let err = decode_snapshot(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }
}
