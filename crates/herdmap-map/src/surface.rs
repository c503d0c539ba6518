//! The drawing surface the renderer talks to.
//!
//! A [`RenderSurface`] is whatever actually paints the map: a browser map
//! widget behind a bridge, a native tile renderer, or the recording
//! [`HeadlessSurface`](crate::HeadlessSurface). The renderer only ever
//! pushes whole-source data, declarative layer definitions, markers and
//! listener registrations through it, so the trait stays small and
//! synchronous.

use herdmap_types::LngLat;
use serde::Serialize;

use crate::feature::FeatureCollection;

/// Clustering options for a point source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterOptions {
    /// Zoom level above which points are no longer clustered.
    pub max_zoom: u8,
    /// Cluster radius in pixels.
    pub radius: u16,
}

/// A named data source and its initial contents.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    /// Initial features.
    pub data: FeatureCollection,
    /// Present for clustered point sources.
    pub cluster: Option<ClusterOptions>,
}

/// Which features of a clustered source a layer draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerFilter {
    /// Every feature.
    #[default]
    All,
    /// Cluster aggregates only.
    Clustered,
    /// Individual points only.
    Unclustered,
}

/// A color, fixed or data-driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorExpr {
    /// Same color for every feature.
    Fixed(String),
    /// Read from a feature property, with a fallback when absent.
    Property {
        /// Property name.
        property: String,
        /// Color used when the property is missing.
        fallback: String,
    },
    /// `then` when the numeric property is greater than zero.
    WhenPositive {
        /// Property name.
        property: String,
        /// Color for positive values.
        then: String,
        /// Color for zero or missing values.
        otherwise: String,
    },
}

/// A circle radius, fixed or stepped on cluster size.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusExpr {
    /// Same radius for every feature.
    Fixed(f64),
    /// `base` below the first step, then each step's radius from its count up.
    StepByPointCount {
        /// Radius for the smallest clusters.
        base: f64,
        /// `(point_count, radius)` thresholds in ascending order.
        steps: Vec<(u32, f64)>,
    },
}

/// How a layer paints its features.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paint {
    /// Polygon fill.
    Fill {
        /// Fill color.
        color: ColorExpr,
    },
    /// Polygon outline or line.
    Line {
        /// Line color.
        color: String,
        /// Width in pixels.
        width: f64,
        /// Dash pattern; empty for solid.
        dasharray: Vec<f64>,
    },
    /// Point circle.
    Circle {
        /// Fill color.
        color: ColorExpr,
        /// Radius.
        radius: RadiusExpr,
        /// Stroke width in pixels.
        stroke_width: f64,
        /// Stroke color.
        stroke_color: String,
    },
    /// Text label.
    Symbol {
        /// Feature property holding the label text.
        text_field: String,
        /// Font size in pixels.
        text_size: f64,
        /// Text color.
        text_color: String,
    },
}

/// A layer drawing one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    /// Layer id, unique on the surface.
    pub id: String,
    /// Source the layer draws.
    pub source: String,
    /// Cluster filter.
    pub filter: LayerFilter,
    /// Paint properties.
    pub paint: Paint,
}

/// A standalone marker with an optional text popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Marker position.
    pub position: LngLat,
    /// Marker color.
    pub color: String,
    /// Popup text, shown on click.
    pub popup: Option<String>,
}

/// Built-in map controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// Zoom and rotation buttons.
    Navigation,
    /// Scale bar.
    Scale,
    /// Fullscreen toggle.
    Fullscreen,
}

/// Initial camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    /// Center position.
    pub center: LngLat,
    /// Zoom level.
    pub zoom: f64,
}

/// Mouse cursor over the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    /// Platform default.
    #[default]
    Default,
    /// Pointing hand.
    Pointer,
}

/// A pointer listener to attach to a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerSpec {
    /// Layer the listener watches.
    pub layer: String,
    /// Pointer event it reacts to.
    pub kind: crate::interaction::PointerKind,
}

/// Handle of an attached listener, used to detach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ListenerId(pub u64);

/// A map drawing surface.
///
/// Calls never fail from the renderer's point of view: a surface that
/// cannot honor a request logs it and carries on.
pub trait RenderSurface: Send {
    /// Place the camera.
    fn set_camera(&mut self, camera: Camera);

    /// Add a built-in control.
    fn add_control(&mut self, control: Control);

    /// Register a named source.
    fn add_source(&mut self, name: &str, source: SourceSpec);

    /// Replace a source's data and redraw the layers that use it.
    fn set_source_data(&mut self, name: &str, data: &FeatureCollection);

    /// Add a layer on top of existing ones.
    fn add_layer(&mut self, layer: LayerSpec);

    /// Add a marker.
    fn add_marker(&mut self, marker: Marker);

    /// Attach a pointer listener.
    fn add_listener(&mut self, listener: ListenerSpec) -> ListenerId;

    /// Detach a listener. Unknown ids are ignored.
    fn remove_listener(&mut self, id: ListenerId);

    /// Change the cursor.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Tear down the surface and release its resources.
    fn remove(&mut self);
}
