//! Error types for routewire.
//!
//! All errors are strongly typed using thiserror so callers can pattern
//! match on specific conditions. Note the deliberate asymmetry with the
//! update protocol: observing a *stale* snapshot is not an error at all
//! (see [`crate::consumer::ApplyOutcome`]); it is expected under
//! at-least-once delivery of updates.

use thiserror::Error;

/// Validation failures raised while building a snapshot from control-plane
/// definitions, or while checking a decoded snapshot against the schema
/// invariants.
///
/// Build-time policy: the offending entity is excluded from the published
/// snapshot and the failure is reported to the producer's caller. A snapshot
/// that violates the uniqueness invariants is never published.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A trigger without a destination cannot route anything.
    #[error("trigger '{trigger}' has an empty destination")]
    EmptyDestination {
        /// Identifier of the offending trigger.
        trigger: String,
    },

    /// Trigger identifiers must be non-empty.
    #[error("trigger identifier cannot be empty")]
    EmptyTriggerId,

    /// Broker identifiers must be non-empty.
    #[error("broker identifier cannot be empty")]
    EmptyBrokerId,

    /// A broker without a source topic has nothing to consume.
    #[error("broker '{broker}' has an empty topic")]
    EmptyTopic {
        /// Identifier of the offending broker.
        broker: String,
    },

    /// Broker identifiers are unique within one snapshot.
    #[error("duplicate broker identifier '{broker}'")]
    DuplicateBrokerId {
        /// The identifier that appeared more than once.
        broker: String,
    },

    /// Trigger identifiers are unique within one broker.
    #[error("duplicate trigger identifier '{trigger}' in broker '{broker}'")]
    DuplicateTriggerId {
        /// Identifier of the owning broker.
        broker: String,
        /// The identifier that appeared more than once.
        trigger: String,
    },
}

/// Failures decoding a serialized snapshot at the transport boundary.
///
/// Policy on any decode failure: reject the update, retain the last-good
/// snapshot, surface the failure to the caller. A malformed snapshot is
/// never partially applied.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The received bytes do not decode into the wire schema.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] prost::DecodeError),

    /// The bytes decoded, but the payload violates a schema invariant
    /// (duplicate identifiers, empty destination). Treated exactly like a
    /// malformed snapshot: the whole update is rejected.
    #[error("invalid snapshot payload: {0}")]
    InvalidPayload(#[from] ValidationError),
}

/// Top-level error type for routewire.
#[derive(Debug, Error)]
pub enum RouteWireError {
    /// A build-time validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A transport-boundary decode failure.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An unexpected internal condition.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable description.
        message: String,
    },
}

impl RouteWireError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a decode error.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type alias for routewire operations.
pub type Result<T> = std::result::Result<T, RouteWireError>;
