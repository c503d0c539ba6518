//! Connection lifecycle state.

use serde::Serialize;

/// Where a [`ConnectionManager`](crate::ConnectionManager) is in its
/// connect/retry cycle.
///
/// ```text
/// Disconnected -> Connecting -> Connected -> RetryPending -> Connecting ...
/// ```
///
/// A refused connect goes straight from `Connecting` to `RetryPending`.
/// `close()` returns the manager to `Disconnected` from any state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection and no retry scheduled.
    #[default]
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// The socket is open and frames are being dispatched.
    Connected,
    /// The last connection failed; a reconnect is scheduled.
    RetryPending,
}

impl ConnectionState {
    /// Whether live events can currently arrive.
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Connected)
    }
}
