//! Triggers: named routing rules pairing an attribute filter with a
//! destination address.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::filter::{AttributeFilter, Attributes};

/// A named routing rule: events passing the filter are routed to the
/// destination.
///
/// Triggers are immutable once created; the only way a consumer observes a
/// changed trigger is through a full snapshot replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    id: String,
    filter: AttributeFilter,
    destination: String,
}

impl Trigger {
    /// Creates a trigger.
    ///
    /// # Errors
    /// - `EmptyTriggerId` if `id` is empty or whitespace
    /// - `EmptyDestination` if `destination` is empty or whitespace; a
    ///   trigger with no destination is invalid and must never reach a
    ///   published snapshot
    pub fn new(
        id: impl Into<String>,
        filter: AttributeFilter,
        destination: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyTriggerId);
        }
        let destination = destination.into();
        if destination.trim().is_empty() {
            return Err(ValidationError::EmptyDestination { trigger: id });
        }
        Ok(Self {
            id,
            filter,
            destination,
        })
    }

    /// Trigger identifier, unique within its owning broker.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The attribute filter events must pass.
    #[must_use]
    pub fn filter(&self) -> &AttributeFilter {
        &self.filter
    }

    /// Destination URI that receives events passing the filter.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Returns true iff the event attributes pass this trigger's filter.
    #[must_use]
    pub fn matches(&self, attributes: &Attributes) -> bool {
        self.filter.matches(attributes)
    }
}
