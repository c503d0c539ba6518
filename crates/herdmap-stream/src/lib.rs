//! Live-location stream client for the Herdmap farm map.
//!
//! This crate owns the one streaming connection a map view keeps open to
//! the farm API:
//!
//! - **[`ConnectionManager`]** opens a socket scoped to a farm context,
//!   decodes every inbound frame into a [`StreamEvent`], and hands it to
//!   the registered handlers in arrival order
//! - **Reconnection** is a fixed-delay loop: every abnormal close (refused
//!   connect, dropped socket, transport error) schedules exactly one new
//!   attempt after [`StreamConfig::reconnect_delay`]; [`ConnectionManager::close`]
//!   cancels it
//! - **Transports** sit behind the [`Connector`] / [`Transport`] traits.
//!   [`WsConnector`] speaks WebSocket via `tokio-tungstenite`;
//!   [`MemoryConnector`] is an in-process feed for tests and local runs
//!
//! Nothing here returns an error to the caller once a connection is
//! requested. Failures are logged through `tracing` and retried.
//!
//! [`StreamEvent`]: herdmap_types::StreamEvent

pub mod config;
pub mod error;
pub mod manager;
pub mod state;
pub mod transport;

// Re-export primary types for convenience.
pub use config::StreamConfig;
pub use error::StreamError;
pub use manager::{ConnectionManager, EventHandler};
pub use state::ConnectionState;
pub use transport::memory::{MemoryConnector, MemoryFeed};
pub use transport::ws::WsConnector;
pub use transport::{Connector, Transport};
