//! Shared type definitions for the Herdmap live farm map.
//!
//! This crate is the single source of truth for the data that crosses the
//! wire between the farm API and the map client: snapshot entities read
//! over REST, and the JSON envelope pushed over the live-location stream.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`geo`] -- `GeoJSON` points, polygons and positions
//! - [`entities`] -- Snapshot entities (animals, zones, key points, session records)
//! - [`events`] -- Stream envelope and the typed events decoded from it
//! - [`api`] -- REST response envelope

pub mod api;
pub mod entities;
pub mod events;
pub mod geo;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use api::ApiResponse;
pub use entities::{Animal, AnimalStatus, Farm, KeyPoint, KeyPointIcon, User, Zone};
pub use events::{
    AlertEvent, DecodeError, DeviceStatusEvent, Envelope, EnvelopeType, EventKind, PositionEvent,
    StreamEvent, decode_envelope, decode_event,
};
pub use geo::{Geometry, LngLat, Point, Polygon};
pub use ids::{AnimalId, FarmId, HerdId, KeyPointId, UserId, ZoneId};
