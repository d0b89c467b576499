//! Brokers: named routing domains grouping a source topic, an ordered set
//! of triggers, and an optional dead-letter sink.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::filter::Attributes;
use crate::trigger::Trigger;

/// A named routing domain.
///
/// Trigger order is irrelevant to matching semantics but is preserved so
/// that serialization is deterministic and [`Broker::route`] results are
/// reproducible. `namespace` and `name` address the owning control-plane
/// resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    id: String,
    topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dead_letter_sink: Option<String>,
    namespace: String,
    name: String,
    triggers: Vec<Trigger>,
}

impl Broker {
    /// Creates a broker with no triggers and no dead-letter sink.
    ///
    /// # Errors
    /// - `EmptyBrokerId` if `id` is empty or whitespace
    /// - `EmptyTopic` if `topic` is empty or whitespace
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyBrokerId);
        }
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic { broker: id });
        }
        Ok(Self {
            id,
            topic,
            dead_letter_sink: None,
            namespace: namespace.into(),
            name: name.into(),
            triggers: Vec::new(),
        })
    }

    /// Sets the dead-letter sink, builder style. An empty string means
    /// "none".
    #[must_use]
    pub fn with_dead_letter_sink(mut self, sink: impl Into<String>) -> Self {
        let sink = sink.into();
        self.dead_letter_sink = if sink.is_empty() { None } else { Some(sink) };
        self
    }

    /// Appends a trigger, builder style.
    ///
    /// # Errors
    /// `DuplicateTriggerId` if a trigger with the same identifier already
    /// exists on this broker.
    pub fn with_trigger(mut self, trigger: Trigger) -> Result<Self, ValidationError> {
        self.push_trigger(trigger)?;
        Ok(self)
    }

    /// Appends a trigger.
    ///
    /// # Errors
    /// `DuplicateTriggerId` if a trigger with the same identifier already
    /// exists on this broker.
    pub fn push_trigger(&mut self, trigger: Trigger) -> Result<(), ValidationError> {
        if self.triggers.iter().any(|t| t.id() == trigger.id()) {
            return Err(ValidationError::DuplicateTriggerId {
                broker: self.id.clone(),
                trigger: trigger.id().to_string(),
            });
        }
        self.triggers.push(trigger);
        Ok(())
    }

    /// Broker identifier, unique within a snapshot.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The source topic this broker consumes.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Fallback destination for events that ultimately fail delivery at
    /// every matched destination. This only exposes the address; retry and
    /// dispatch logic belong to an external collaborator.
    #[must_use]
    pub fn dead_letter_sink(&self) -> Option<&str> {
        self.dead_letter_sink.as_deref()
    }

    /// Namespace of the owning control-plane resource.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name of the owning control-plane resource.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Triggers in their original (serialization) order.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Resolves the destinations for an event.
    ///
    /// Walks the trigger sequence in order and collects the destination of
    /// every trigger whose filter matches. Zero matches yield an empty
    /// vector, not an error.
    #[must_use]
    pub fn route(&self, attributes: &Attributes) -> Vec<&str> {
        self.triggers
            .iter()
            .filter(|t| t.matches(attributes))
            .map(Trigger::destination)
            .collect()
    }
}
