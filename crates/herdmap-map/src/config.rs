//! Renderer configuration.
//!
//! Loaded as the `map` section of the dashboard config file. Every field
//! has a default so the section can be omitted entirely.

use herdmap_types::{HerdId, LngLat};
use serde::Deserialize;

/// How [`MapRenderer::reconcile`](crate::MapRenderer::reconcile) treats
/// updates that arrive out of timestamp order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// The most recently delivered update wins, whatever its timestamp.
    #[default]
    ArrivalOrder,
    /// An update older than the last one applied to the same animal is
    /// discarded.
    EventTime,
}

/// Map renderer settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapConfig {
    /// Zoom level above which animal points are no longer clustered.
    #[serde(default = "default_cluster_max_zoom")]
    pub cluster_max_zoom: u8,

    /// Cluster radius in pixels.
    #[serde(default = "default_cluster_radius")]
    pub cluster_radius: u16,

    /// Camera center used when no animal has a known position.
    #[serde(default = "default_center")]
    pub default_center: LngLat,

    /// Initial zoom level.
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// When set, only animals of this herd are drawn.
    #[serde(default)]
    pub herd_filter: Option<HerdId>,

    /// Out-of-order update handling.
    #[serde(default)]
    pub stale_policy: StalePolicy,
}

const fn default_cluster_max_zoom() -> u8 {
    14
}

const fn default_cluster_radius() -> u16 {
    40
}

const fn default_center() -> LngLat {
    LngLat::new(-55.0, -20.2)
}

const fn default_zoom() -> f64 {
    12.0
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cluster_max_zoom: default_cluster_max_zoom(),
            cluster_radius: default_cluster_radius(),
            default_center: default_center(),
            default_zoom: default_zoom(),
            herd_filter: None,
            stale_policy: StalePolicy::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: MapConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.cluster_max_zoom, 14);
        assert_eq!(config.cluster_radius, 40);
        assert_eq!(config.default_zoom, 12.0);
        assert_eq!(config.stale_policy, StalePolicy::ArrivalOrder);
    }

    #[test]
    fn overrides_are_read() {
        let config: MapConfig = serde_json::from_str(
            r#"{"cluster_radius": 60, "default_center": [-47.9, -15.8],
                "stale_policy": "event_time"}"#,
        )
        .unwrap();
        assert_eq!(config.cluster_radius, 60);
        assert_eq!(config.default_center, LngLat::new(-47.9, -15.8));
        assert_eq!(config.stale_policy, StalePolicy::EventTime);
        assert_eq!(config.cluster_max_zoom, 14);
    }
}
