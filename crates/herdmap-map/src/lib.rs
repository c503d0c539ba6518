//! Map renderer for the Herdmap live farm map.
//!
//! The renderer draws a farm snapshot onto an opaque [`RenderSurface`]
//! and then keeps animal positions current by patching one feature at a
//! time:
//!
//! - **Static layers**: zone polygons (fill colored by occupancy, dashed
//!   accent outline) and key-point markers
//! - **Dynamic layer**: one clustered point source holding every animal
//!   with a known position
//! - **Reconciliation**: [`MapRenderer::reconcile`] moves the feature
//!   whose id matches a [`PositionEvent`] and redraws that source only.
//!   Unknown ids are ignored; features are never added or removed
//!
//! # Architecture
//!
//! The renderer owns the logical feature collections. The surface is a
//! collaborator that only receives whole-source data pushes, layer
//! definitions, markers and listeners. [`HeadlessSurface`] is a recording
//! implementation used by the runner binary and the tests.
//!
//! [`PositionEvent`]: herdmap_types::PositionEvent

pub mod config;
pub mod feature;
pub mod headless;
pub mod interaction;
pub mod renderer;
pub mod style;
pub mod surface;

// Re-export primary types for convenience.
pub use config::{MapConfig, StalePolicy};
pub use feature::{Feature, FeatureCollection, FeatureId};
pub use headless::{HeadlessSurface, SourceRecord};
pub use interaction::{PointerEvent, PointerKind, Popup};
pub use renderer::{MapRenderer, Phase};
pub use surface::{
    Camera, ClusterOptions, ColorExpr, Control, Cursor, LayerFilter, LayerSpec, ListenerId,
    ListenerSpec, Marker, Paint, RadiusExpr, RenderSurface, SourceSpec,
};
