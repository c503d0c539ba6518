//! Transport abstraction for the live-location stream.
//!
//! The session loop in [`manager`](crate::manager) only needs two
//! capabilities: dial an endpoint, then pull text frames until the
//! connection ends. [`Connector`] and [`Transport`] capture exactly that,
//! so the reconnect logic can be exercised against [`memory`] feeds
//! without a network.
//!
//! # Implementations
//!
//! - [`ws::WsConnector`] -- WebSocket over `tokio-tungstenite`
//! - [`memory::MemoryConnector`] -- in-process scripted feed

use std::future::Future;

use crate::error::StreamError;

pub mod memory;
pub mod ws;

/// An open stream connection.
pub trait Transport: Send {
    /// Wait for the next text frame.
    ///
    /// Returns `None` when the peer ended the connection, and
    /// `Some(Err(_))` when the connection failed. Both count as an
    /// abnormal close. Control frames are consumed internally and never
    /// surface here.
    fn next_frame(&mut self) -> impl Future<Output = Option<Result<String, StreamError>>> + Send;

    /// Terminate the connection from our side.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Dials stream endpoints.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by a successful dial.
    type Transport: Transport + 'static;

    /// Open a connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Connect`] if the endpoint cannot be reached
    /// or refuses the connection.
    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Transport, StreamError>> + Send;
}
