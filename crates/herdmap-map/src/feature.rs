//! Logical feature collections backing the map sources.
//!
//! A [`FeatureCollection`] is an insertion-ordered set of features keyed
//! by [`FeatureId`]. Ids are unique: inserting a second feature with an
//! existing id is refused. Once built, a collection only ever changes by
//! moving an existing point ([`FeatureCollection::set_point`]); this is
//! what keeps reconciliation from growing or shrinking the map.
//!
//! Collections serialize as `GeoJSON` `FeatureCollection` objects, which is
//! what a mapping library's source expects.

use std::collections::HashMap;
use std::fmt;

use herdmap_types::{Geometry, LngLat};
use serde::ser::SerializeStruct as _;
use serde::{Serialize, Serializer};

/// Identifier of a drawable feature, unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! feature_id_from_entity {
    ($($id:ty),*) => {
        $(
            impl From<$id> for FeatureId {
                fn from(id: $id) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

feature_id_from_entity!(
    herdmap_types::AnimalId,
    herdmap_types::ZoneId,
    herdmap_types::KeyPointId
);

/// One drawable element: an id, a geometry and display properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature identifier.
    pub id: FeatureId,
    /// Point or polygon geometry.
    pub geometry: Geometry,
    /// Display properties (name, color...). `id` is added on serialization.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    /// Create a feature with no properties.
    pub fn new(id: impl Into<FeatureId>, geometry: impl Into<Geometry>) -> Self {
        Self {
            id: id.into(),
            geometry: geometry.into(),
            properties: serde_json::Map::new(),
        }
    }

    /// Set one display property, builder style.
    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_owned(), value.into());
        self
    }

    /// Read a string property.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read a numeric property.
    pub fn f64_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Read a non-negative integer property.
    pub fn u64_property(&self, key: &str) -> Option<u64> {
        self.properties.get(key).and_then(serde_json::Value::as_u64)
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut properties = self.properties.clone();
        properties.insert(
            String::from("id"),
            serde_json::Value::String(self.id.0.clone()),
        );
        let mut state = serializer.serialize_struct("Feature", 4)?;
        state.serialize_field("type", "Feature")?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("properties", &properties)?;
        state.serialize_field("geometry", &self.geometry)?;
        state.end()
    }
}

/// Insertion-ordered features with unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<Feature>,
    index: HashMap<FeatureId, usize>,
}

impl FeatureCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature.
    ///
    /// Returns `false` and leaves the collection unchanged if a feature
    /// with the same id is already present.
    pub fn insert(&mut self, feature: Feature) -> bool {
        if self.index.contains_key(&feature.id) {
            return false;
        }
        self.index.insert(feature.id.clone(), self.features.len());
        self.features.push(feature);
        true
    }

    /// Look up a feature by id.
    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.index.get(id).and_then(|&i| self.features.get(i))
    }

    /// Whether a feature with this id exists.
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.index.contains_key(id)
    }

    /// Move an existing point feature to `position`.
    ///
    /// Returns `false` without changing anything when the id is unknown or
    /// the feature is not a point.
    pub fn set_point(&mut self, id: &FeatureId, position: LngLat) -> bool {
        let Some(feature) = self
            .index
            .get(id)
            .copied()
            .and_then(|i| self.features.get_mut(i))
        else {
            return false;
        };
        match &mut feature.geometry {
            Geometry::Point { coordinates } => {
                *coordinates = position;
                true
            }
            Geometry::Polygon { .. } => false,
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Drop every feature.
    pub fn clear(&mut self) {
        self.features.clear();
        self.index.clear();
    }
}

impl FromIterator<Feature> for FeatureCollection {
    /// Collect features, keeping the first of any duplicated id.
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut collection = Self::new();
        for feature in iter {
            collection.insert(feature);
        }
        collection
    }
}

impl Serialize for FeatureCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FeatureCollection", 2)?;
        state.serialize_field("type", "FeatureCollection")?;
        state.serialize_field("features", &self.features)?;
        state.end()
    }
}
