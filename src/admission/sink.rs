//! Sink resource definitions: addressable endpoints backed by a topic.

use serde::{Deserialize, Serialize};

use super::fields::{FieldError, ImmutableField};
use super::{Admissible, ResourceKind};

/// How events are encoded when written to the sink's topic.
///
/// A closed set: an unknown mode is unrepresentable, so validation never has
/// to check the value against an allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// Event attributes in headers, payload as the record value.
    Binary,
    /// The whole event serialized into the record value.
    Structured,
}

/// Desired state of a sink resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSpec {
    /// Topic backing the sink.
    pub topic: String,
    /// Partition count for topic provisioning.
    pub num_partitions: i32,
    /// Replication factor for topic provisioning.
    pub replication_factor: i16,
    /// Bootstrap servers for the backing cluster, comma separated.
    pub bootstrap_servers: String,
    /// Content mode; defaulted to [`ContentMode::Binary`] at admission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_mode: Option<ContentMode>,
}

/// A sink resource: identity plus desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkResource {
    /// Control-plane identifier (unique across the cluster).
    pub id: String,
    /// Namespace of the resource.
    #[serde(default)]
    pub namespace: String,
    /// Name of the resource.
    pub name: String,
    /// Desired state.
    pub spec: SinkSpec,
}

const SINK_IMMUTABLE: &[ImmutableField<SinkResource>] = &[
    ImmutableField {
        path: "spec.numPartitions",
        differs: |a, b| a.spec.num_partitions != b.spec.num_partitions,
    },
    ImmutableField {
        path: "spec.replicationFactor",
        differs: |a, b| a.spec.replication_factor != b.spec.replication_factor,
    },
    ImmutableField {
        path: "spec.bootstrapServers",
        differs: |a, b| a.spec.bootstrap_servers != b.spec.bootstrap_servers,
    },
];

impl Admissible for SinkResource {
    const KIND: ResourceKind = ResourceKind::Sink;

    fn apply_defaults(&mut self) {
        if self.namespace.is_empty() {
            self.namespace = "default".to_string();
        }
        self.spec.content_mode.get_or_insert(ContentMode::Binary);
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
        if self.spec.num_partitions <= 0 {
            errs.push(FieldError::invalid_value(
                "spec.numPartitions",
                self.spec.num_partitions,
            ));
        }
        if self.spec.replication_factor <= 0 {
            errs.push(FieldError::invalid_value(
                "spec.replicationFactor",
                self.spec.replication_factor,
            ));
        }
        if self.spec.bootstrap_servers.trim().is_empty() {
            errs.push(FieldError::missing("spec.bootstrapServers"));
        }

        errs
    }

    fn immutable_fields() -> &'static [ImmutableField<Self>] {
        SINK_IMMUTABLE
    }
}
