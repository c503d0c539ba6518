//! `GeoJSON` geometry as served by the farm API.
//!
//! Positions are `[longitude, latitude]` pairs, longitude first, exactly
//! as `GeoJSON` orders them. Only the two geometry types the map needs are
//! modelled: points (animal positions, key points) and polygons (zones).

use serde::{Deserialize, Serialize};

/// A single `[longitude, latitude]` position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
}

impl LngLat {
    /// Create a position from longitude and latitude.
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(pos: LngLat) -> Self {
        [pos.lng, pos.lat]
    }
}

/// A `GeoJSON` `Point` geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Point")]
pub struct Point {
    /// The point's position.
    pub coordinates: LngLat,
}

impl Point {
    /// Create a point at the given position.
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self {
            coordinates: LngLat::new(lng, lat),
        }
    }
}

/// A `GeoJSON` `Polygon` geometry: an outer ring followed by any holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Polygon")]
pub struct Polygon {
    /// Linear rings; the first is the exterior.
    pub coordinates: Vec<Vec<LngLat>>,
}

impl Polygon {
    /// Create a polygon from a single exterior ring.
    pub fn from_ring(ring: Vec<LngLat>) -> Self {
        Self {
            coordinates: vec![ring],
        }
    }
}

/// Any geometry a map feature can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// The point's position.
        coordinates: LngLat,
    },
    /// A polygon with an exterior ring and optional holes.
    Polygon {
        /// Linear rings; the first is the exterior.
        coordinates: Vec<Vec<LngLat>>,
    },
}

impl Geometry {
    /// Return the position if this is a point geometry.
    pub const fn as_point(&self) -> Option<LngLat> {
        match self {
            Self::Point { coordinates } => Some(*coordinates),
            Self::Polygon { .. } => None,
        }
    }
}

impl From<Point> for Geometry {
    fn from(point: Point) -> Self {
        Self::Point {
            coordinates: point.coordinates,
        }
    }
}

impl From<Polygon> for Geometry {
    fn from(polygon: Polygon) -> Self {
        Self::Polygon {
            coordinates: polygon.coordinates,
        }
    }
}
