//! Error types for the stream client.
//!
//! These errors never reach the caller of [`ConnectionManager`]: the
//! session loop logs them and schedules a reconnect. They exist so
//! [`Connector`] and [`Transport`] implementations can report what went
//! wrong.
//!
//! [`ConnectionManager`]: crate::ConnectionManager
//! [`Connector`]: crate::Connector
//! [`Transport`]: crate::Transport

/// Errors raised by a stream transport.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The connection could not be established.
    #[error("connect to {url} failed: {message}")]
    Connect {
        /// Endpoint that was dialed.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The established connection failed while reading.
    #[error("transport error: {0}")]
    Transport(String),
}
