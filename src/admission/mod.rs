//! Admission checks for control-plane resources.
//!
//! The resource kinds form a closed, compile-time-checked set: each kind
//! implements the fixed [`Admissible`] capability (defaulting, validation,
//! declarative immutable fields), and [`Resource`] dispatches by explicit
//! kind tag. Immutable fields are declared as data and compared generically;
//! see [`fields`].

mod broker;
mod fields;
mod sink;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use broker::{BrokerResource, BrokerSpec, TriggerDefinition};
pub use fields::{check_immutable, FieldError, ImmutableField};
pub use sink::{ContentMode, SinkResource, SinkSpec};

/// The closed set of admission-controlled resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// An event-routing domain with triggers.
    Broker,
    /// An addressable endpoint backed by a topic.
    Sink,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broker => f.write_str("Broker"),
            Self::Sink => f.write_str("Sink"),
        }
    }
}

/// The fixed admission capability every resource kind implements.
pub trait Admissible {
    /// Kind tag used for dispatch and error reporting.
    const KIND: ResourceKind;

    /// Fills defaulted fields in place before validation.
    fn apply_defaults(&mut self);

    /// Validates the resource, returning every field-level failure.
    fn validate(&self) -> Vec<FieldError>;

    /// Declarative list of immutable spec field paths, checked on update.
    fn immutable_fields() -> &'static [ImmutableField<Self>]
    where
        Self: Sized;
}

/// A resource of any admitted kind, tagged explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    /// A broker resource.
    Broker(BrokerResource),
    /// A sink resource.
    Sink(SinkResource),
}

impl Resource {
    /// The kind tag of this resource.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Broker(_) => ResourceKind::Broker,
            Self::Sink(_) => ResourceKind::Sink,
        }
    }

    fn apply_defaults(&mut self) {
        match self {
            Self::Broker(r) => r.apply_defaults(),
            Self::Sink(r) => r.apply_defaults(),
        }
    }

    fn validate_fields(&self) -> Vec<FieldError> {
        match self {
            Self::Broker(r) => r.validate(),
            Self::Sink(r) => r.validate(),
        }
    }
}

/// An admission rejection: one or more field-level failures on one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionError {
    /// Kind of the rejected resource.
    pub kind: ResourceKind,
    /// Every failed field, in validation order.
    pub errors: Vec<FieldError>,
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected: ", self.kind)?;
        for (pos, err) in self.errors.iter().enumerate() {
            if pos > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AdmissionError {}

fn into_result(kind: ResourceKind, errors: Vec<FieldError>) -> Result<(), AdmissionError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdmissionError { kind, errors })
    }
}

/// Admits a newly created resource: applies defaults, then validates.
///
/// # Errors
/// `AdmissionError` carrying every failed field.
pub fn admit_create(resource: &mut Resource) -> Result<(), AdmissionError> {
    resource.apply_defaults();
    into_result(resource.kind(), resource.validate_fields())
}

/// Admits an update: applies defaults, validates, and checks the declared
/// immutable fields against the original.
///
/// # Errors
/// `AdmissionError` if validation fails, an immutable field changed, or the
/// update switches resource kinds.
pub fn admit_update(original: &Resource, updated: &mut Resource) -> Result<(), AdmissionError> {
    updated.apply_defaults();

    let mut errors = updated.validate_fields();
    match (original, &*updated) {
        (Resource::Broker(orig), Resource::Broker(new)) => {
            errors.extend(check_immutable(BrokerResource::immutable_fields(), orig, new));
        }
        (Resource::Sink(orig), Resource::Sink(new)) => {
            errors.extend(check_immutable(SinkResource::immutable_fields(), orig, new));
        }
        _ => {
            errors.push(FieldError::new(
                "kind",
                format!(
                    "cannot change kind from {} to {}",
                    original.kind(),
                    updated.kind()
                ),
            ));
        }
    }

    into_result(updated.kind(), errors)
}
