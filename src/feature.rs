//! In-memory feature records.

use crate::geometry::{Geometry, Wkb};
use crate::value::Value;
use std::collections::BTreeMap;

/// Property mapping of a feature. Ordered by key so encoding is deterministic.
pub type Properties = BTreeMap<String, Value>;

/// A geometry plus its typed properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature<G: Geometry = Wkb> {
    pub geometry: G,
    pub properties: Properties,
}

impl<G: Geometry> Feature<G> {
    pub fn new(geometry: G, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// A feature without properties.
    pub fn from_geometry(geometry: G) -> Self {
        Self::new(geometry, Properties::new())
    }

    /// Adds or replaces a property, builder style.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Builds a properties mapping from a JSON object.
///
/// Fails with `Error::UnsupportedPropertyType` on the first value that is not
/// a string, unsigned integer or float.
#[cfg(feature = "serde")]
pub fn properties_from_json(
    object: &serde_json::Map<String, serde_json::Value>,
) -> crate::Result<Properties> {
    object
        .iter()
        .map(|(key, value)| Ok((key.clone(), Value::from_json(key, value)?)))
        .collect()
}
