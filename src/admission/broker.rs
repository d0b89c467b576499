//! Broker resource definitions as submitted to the control plane.
//!
//! These are the logical Broker/Trigger definitions carried by change
//! notifications from the resource-management layer; the snapshot builder
//! lowers them into the immutable routing table.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::fields::{FieldError, ImmutableField};
use super::{Admissible, ResourceKind};

/// A trigger as declared on a broker resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    /// Trigger identifier, unique within the owning broker.
    pub id: String,
    /// Exact-match attribute requirements.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Destination URI for events passing the filter.
    pub destination: String,
}

/// Desired state of a broker resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerSpec {
    /// Source topic the broker consumes.
    pub topic: String,
    /// Optional dead-letter sink URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_sink: Option<String>,
    /// Declared triggers.
    #[serde(default)]
    pub triggers: Vec<TriggerDefinition>,
}

/// A broker resource: identity plus desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerResource {
    /// Control-plane identifier (unique across the cluster).
    pub id: String,
    /// Namespace of the resource.
    #[serde(default)]
    pub namespace: String,
    /// Name of the resource.
    pub name: String,
    /// Desired state.
    pub spec: BrokerSpec,
}

const BROKER_IMMUTABLE: &[ImmutableField<BrokerResource>] = &[ImmutableField {
    path: "spec.topic",
    differs: |a, b| a.spec.topic != b.spec.topic,
}];

impl Admissible for BrokerResource {
    const KIND: ResourceKind = ResourceKind::Broker;

    fn apply_defaults(&mut self) {
        if self.namespace.is_empty() {
            self.namespace = "default".to_string();
        }
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errs = Vec::new();

        if self.id.trim().is_empty() {
            errs.push(FieldError::missing("id"));
        }
        if self.name.trim().is_empty() {
            errs.push(FieldError::missing("name"));
        }
        if self.spec.topic.trim().is_empty() {
            errs.push(FieldError::missing("spec.topic"));
        }

        let mut seen = BTreeSet::new();
        for (pos, trigger) in self.spec.triggers.iter().enumerate() {
            if trigger.id.trim().is_empty() {
                errs.push(FieldError::missing(format!("spec.triggers[{pos}].id")));
            } else if !seen.insert(trigger.id.as_str()) {
                errs.push(FieldError::invalid_value(
                    format!("spec.triggers[{pos}].id"),
                    format!("duplicate trigger identifier '{}'", trigger.id),
                ));
            }
            if trigger.destination.trim().is_empty() {
                errs.push(FieldError::missing(format!(
                    "spec.triggers[{pos}].destination"
                )));
            }
        }

        errs
    }

    fn immutable_fields() -> &'static [ImmutableField<Self>] {
        BROKER_IMMUTABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::fields::check_immutable;

    fn valid_resource() -> BrokerResource {
        BrokerResource {
            id: "uid-1".to_string(),
            namespace: "ns".to_string(),
            name: "demo".to_string(),
            spec: BrokerSpec {
                topic: "topic-1".to_string(),
                dead_letter_sink: None,
                triggers: vec![TriggerDefinition {
                    id: "t1".to_string(),
                    attributes: BTreeMap::new(),
                    destination: "http://d1".to_string(),
                }],
            },
        }
    }

    #[test]
    fn valid_resource_passes() {
        assert!(valid_resource().validate().is_empty());
    }

    #[test]
    fn empty_topic_and_destination_are_reported_with_paths() {
        let mut resource = valid_resource();
        resource.spec.topic.clear();
        resource.spec.triggers[0].destination.clear();

        let errs = resource.validate();
        let paths: Vec<&str> = errs.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"spec.topic"));
        assert!(paths.contains(&"spec.triggers[0].destination"));
    }

    #[test]
    fn duplicate_trigger_ids_are_reported() {
        let mut resource = valid_resource();
        resource.spec.triggers.push(TriggerDefinition {
            id: "t1".to_string(),
            attributes: BTreeMap::new(),
            destination: "http://d2".to_string(),
        });

        let errs = resource.validate();
        assert!(errs.iter().any(|e| e.path == "spec.triggers[1].id"));
    }

    #[test]
    fn topic_is_immutable() {
        let original = valid_resource();
        let mut updated = original.clone();
        updated.spec.topic = "topic-2".to_string();

        let errs = check_immutable(BrokerResource::immutable_fields(), &original, &updated);
        assert_eq!(errs, vec![FieldError::immutable("spec.topic")]);
    }

    #[test]
    fn namespace_defaults() {
        let mut resource = valid_resource();
        resource.namespace.clear();
        resource.apply_defaults();
        assert_eq!(resource.namespace, "default");
    }
}
