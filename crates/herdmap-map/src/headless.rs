//! A surface that draws nothing and records everything.
//!
//! Used by the `herdmap-live` runner when no display is attached, and by
//! tests to assert on what the renderer asked for: which sources exist and
//! what they hold, how many times each was redrawn, which listeners are
//! still attached, and whether the surface has been torn down.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::feature::FeatureCollection;
use crate::surface::{
    Camera, ClusterOptions, Control, Cursor, LayerSpec, ListenerId, ListenerSpec, Marker,
    RenderSurface, SourceSpec,
};

/// Recorded state of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// Current data.
    pub data: FeatureCollection,
    /// Clustering, if requested.
    pub cluster: Option<ClusterOptions>,
    /// Number of `set_source_data` calls since the source was added.
    pub redraws: usize,
}

/// Recording [`RenderSurface`].
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    camera: Option<Camera>,
    controls: Vec<Control>,
    sources: BTreeMap<String, SourceRecord>,
    layers: Vec<LayerSpec>,
    markers: Vec<Marker>,
    listeners: BTreeMap<ListenerId, ListenerSpec>,
    next_listener: u64,
    cursor: Cursor,
    removed: bool,
}

impl HeadlessSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera placement, once set.
    pub const fn camera(&self) -> Option<Camera> {
        self.camera
    }

    /// Controls in the order they were added.
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// A source by name.
    pub fn source(&self, name: &str) -> Option<&SourceRecord> {
        self.sources.get(name)
    }

    /// Layers in drawing order.
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// A layer by id.
    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Markers in the order they were added.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Listeners still attached.
    pub fn listeners(&self) -> impl Iterator<Item = &ListenerSpec> {
        self.listeners.values()
    }

    /// Current cursor.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether [`RenderSurface::remove`] has been called.
    pub const fn is_removed(&self) -> bool {
        self.removed
    }
}

impl RenderSurface for HeadlessSurface {
    fn set_camera(&mut self, camera: Camera) {
        debug!(
            lng = camera.center.lng,
            lat = camera.center.lat,
            zoom = camera.zoom,
            "camera set"
        );
        self.camera = Some(camera);
    }

    fn add_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    fn add_source(&mut self, name: &str, source: SourceSpec) {
        debug!(
            source = name,
            features = source.data.len(),
            clustered = source.cluster.is_some(),
            "source added"
        );
        self.sources.insert(
            name.to_owned(),
            SourceRecord {
                data: source.data,
                cluster: source.cluster,
                redraws: 0,
            },
        );
    }

    fn set_source_data(&mut self, name: &str, data: &FeatureCollection) {
        let Some(record) = self.sources.get_mut(name) else {
            warn!(source = name, "data pushed to unknown source");
            return;
        };
        record.data = data.clone();
        record.redraws = record.redraws.saturating_add(1);
        trace!(source = name, redraws = record.redraws, "source redrawn");
    }

    fn add_layer(&mut self, layer: LayerSpec) {
        if !self.sources.contains_key(&layer.source) {
            warn!(layer = %layer.id, source = %layer.source, "layer added for unknown source");
        }
        self.layers.push(layer);
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn add_listener(&mut self, listener: ListenerSpec) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.saturating_add(1);
        self.listeners.insert(id, listener);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn remove(&mut self) {
        debug!(
            sources = self.sources.len(),
            layers = self.layers.len(),
            markers = self.markers.len(),
            "surface removed"
        );
        self.removed = true;
    }
}
