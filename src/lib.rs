//! Versioned routing-configuration snapshots for event brokers.
//!
//! A control plane owns a set of broker and trigger definitions; data planes
//! route events against a read-only copy of that set. This crate is the
//! contract between the two sides:
//!
//! - [`admission`] admits resource definitions into the control plane
//!   (defaulting, field validation, immutable-field checks).
//! - [`builder`] lowers admitted definitions into a [`ConfigSnapshot`] and
//!   stamps each publish with a strictly increasing generation.
//! - [`wire`] encodes snapshots into a stable protobuf format with frozen
//!   field tags, so producers and consumers can upgrade independently.
//! - [`consumer`] holds a data plane's serving table behind an atomic
//!   pointer: stale generations are discarded and newer ones are swapped in
//!   whole, so concurrent route resolution never observes a partial update.
//! - [`feed`] is an in-process reference transport for wiring the two sides
//!   together.
//!
//! # Example
//!
//! ```
//! use routewire::{wire, AttributeFilter, Broker, ConfigSnapshot, SnapshotCache, Trigger};
//!
//! # fn main() -> routewire::Result<()> {
//! let broker = Broker::new("b1", "topic-1", "default", "demo")?
//!     .with_trigger(Trigger::new(
//!         "t1",
//!         AttributeFilter::new().with("type", "order.created"),
//!         "http://orders.svc",
//!     )?)?;
//! let snapshot = ConfigSnapshot::new(1, vec![broker])?;
//!
//! // Producer side: encode and ship.
//! let bytes = wire::encode_snapshot(&snapshot);
//!
//! // Consumer side: decode, apply, route.
//! let cache = SnapshotCache::new();
//! cache.apply_encoded(&bytes)?;
//!
//! let attributes = [("type".to_string(), "order.created".to_string())]
//!     .into_iter()
//!     .collect();
//! assert_eq!(
//!     cache.route("b1", &attributes),
//!     Some(vec!["http://orders.svc".to_string()])
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admission;
pub mod broker;
pub mod builder;
pub mod consumer;
pub mod error;
pub mod feed;
pub mod filter;
pub mod snapshot;
pub mod trigger;
pub mod wire;

pub use broker::Broker;
pub use builder::{build, BuildReport, Rejection, SnapshotPublisher};
pub use consumer::{ApplyOutcome, SnapshotCache, SyncState};
pub use error::{DecodeError, Result, RouteWireError, ValidationError};
pub use feed::{SnapshotFeed, SnapshotSubscription};
pub use filter::{AttributeFilter, Attributes};
pub use snapshot::ConfigSnapshot;
pub use trigger::Trigger;
