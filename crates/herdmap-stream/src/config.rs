//! Stream connection settings.

use std::time::Duration;

use serde::Deserialize;

/// Where to connect and how long to wait between reconnect attempts.
///
/// Mirrors the `stream` section of `herdmap-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamConfig {
    /// Base WebSocket endpoint; the farm context is appended as `farm_id`.
    #[serde(default = "default_url")]
    pub url: String,

    /// Fixed delay before each reconnect attempt, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl StreamConfig {
    /// Fixed delay before each reconnect attempt.
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Build the endpoint URL for one farm context.
    ///
    /// Context ids are UUID strings and are appended verbatim.
    pub fn endpoint(&self, context_id: &str) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{sep}farm_id={context_id}", self.url)
    }
}

fn default_url() -> String {
    String::from("ws://localhost:8080/api/v1/ws")
}

const fn default_reconnect_delay_ms() -> u64 {
    3000
}
