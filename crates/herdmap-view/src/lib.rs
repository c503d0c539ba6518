//! The live farm map view and the plumbing around it.
//!
//! [`FarmMapView`] composes the pieces: it pulls a snapshot through a
//! [`SnapshotSource`], draws it with a [`MapRenderer`], and feeds position
//! updates from a [`ConnectionManager`] into the renderer until unmounted.
//!
//! The rest of the crate is what a real deployment needs around that:
//! the YAML dashboard config ([`DashboardConfig`]), the persisted login
//! session ([`SessionStore`]), and the REST client that serves snapshots
//! ([`ApiClient`]).
//!
//! [`MapRenderer`]: herdmap_map::MapRenderer
//! [`ConnectionManager`]: herdmap_stream::ConnectionManager

pub mod api;
pub mod config;
pub mod session;
pub mod snapshot;
pub mod view;

// Re-export primary types for convenience.
pub use api::{ApiClient, ApiError};
pub use config::{ApiConfig, ConfigError, DashboardConfig, SessionConfig};
pub use session::{Session, SessionError, SessionStore};
pub use snapshot::{Snapshot, SnapshotSource};
pub use view::{FarmMapView, ViewError, ViewStats};
