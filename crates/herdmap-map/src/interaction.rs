//! Pointer events reported by the host and the popups they produce.

use herdmap_types::LngLat;
use serde::Serialize;

use crate::feature::FeatureId;

/// Kind of pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Click or tap.
    Click,
    /// Pointer moved onto a feature.
    Enter,
    /// Pointer left a feature.
    Leave,
}

/// A pointer interaction on a layer, as reported by the surface host.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Layer the pointer is over.
    pub layer: String,
    /// Feature under the pointer, if any.
    pub feature: Option<FeatureId>,
    /// Pointer position.
    pub position: LngLat,
}

/// An information popup to show on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    /// Where to anchor the popup.
    pub position: LngLat,
    /// Bold first line.
    pub title: String,
    /// Detail lines under the title.
    pub lines: Vec<String>,
    /// Relative link to a detail page, if any.
    pub link: Option<String>,
}
