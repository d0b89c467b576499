//! Attribute filters: exact-match predicates over event context attributes.
//!
//! A filter is a set of `attribute-name -> required-value` pairs. An event
//! passes the filter iff every required pair is present in the event's
//! context attributes with a byte-identical value. The filter is a subset
//! test: extra attributes on the event are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Event context attributes, attribute-name to value.
///
/// Only scalar string values are supported; nested or structured attribute
/// values are not representable.
pub type Attributes = BTreeMap<String, String>;

/// An exact-match predicate set over event context attributes.
///
/// Entries are kept in an ordered map so that keys are unique and
/// serialization is deterministic. Matching is pure and reads immutable
/// state only, so a filter shared behind an `Arc` may be evaluated from any
/// number of threads without synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeFilter {
    entries: BTreeMap<String, String>,
}

impl AttributeFilter {
    /// Creates an empty filter. An empty filter matches every event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required attribute, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Adds a required attribute. Replaces any previous requirement for the
    /// same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Returns true if the filter has no requirements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of required attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the required `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true iff every required attribute is present in `attributes`
    /// with an identical string value.
    ///
    /// Comparison is exact byte-for-byte equality: no wildcards, no type
    /// coercion, no case folding. A required key absent from the event is a
    /// non-match, not an error.
    #[must_use]
    pub fn matches(&self, attributes: &Attributes) -> bool {
        self.entries
            .iter()
            .all(|(name, required)| attributes.get(name).is_some_and(|v| v == required))
    }
}

impl From<BTreeMap<String, String>> for AttributeFilter {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, String)> for AttributeFilter {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = AttributeFilter::new();
        assert!(filter.matches(&Attributes::new()));
        assert!(filter.matches(&attrs(&[("type", "foo"), ("source", "x")])));
    }

    #[test]
    fn subset_match_ignores_extra_event_attributes() {
        let filter = AttributeFilter::new().with("type", "foo");
        assert!(filter.matches(&attrs(&[("type", "foo"), ("source", "x")])));
    }

    #[test]
    fn missing_key_is_a_non_match() {
        let filter = AttributeFilter::new().with("type", "foo");
        assert!(!filter.matches(&attrs(&[("source", "x")])));
        assert!(!filter.matches(&Attributes::new()));
    }

    #[test]
    fn value_mismatch_is_a_non_match() {
        let filter = AttributeFilter::new().with("type", "foo");
        assert!(!filter.matches(&attrs(&[("type", "bar")])));
    }

    #[test]
    fn comparison_is_exact_bytes() {
        let filter = AttributeFilter::new().with("type", "Foo");
        assert!(!filter.matches(&attrs(&[("type", "foo")])));
        assert!(filter.matches(&attrs(&[("type", "Foo")])));

        // No type coercion.
        let filter = AttributeFilter::new().with("count", "1");
        assert!(!filter.matches(&attrs(&[("count", "01")])));
    }

    #[test]
    fn all_keys_must_match() {
        let filter = AttributeFilter::new()
            .with("type", "foo")
            .with("source", "x");
        assert!(filter.matches(&attrs(&[("type", "foo"), ("source", "x")])));
        assert!(!filter.matches(&attrs(&[("type", "foo")])));
        assert!(!filter.matches(&attrs(&[("type", "foo"), ("source", "y")])));
    }

    #[test]
    fn insert_replaces_previous_requirement() {
        let mut filter = AttributeFilter::new().with("type", "foo");
        filter.insert("type", "bar");
        assert_eq!(filter.len(), 1);
        assert!(filter.matches(&attrs(&[("type", "bar")])));
        assert!(!filter.matches(&attrs(&[("type", "foo")])));
    }
}
