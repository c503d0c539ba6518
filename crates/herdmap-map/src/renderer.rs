//! The map renderer: snapshot drawing and live position reconciliation.
//!
//! # Lifecycle
//!
//! ```text
//! Pending --initialize--> Ready --dispose--> Disposed
//!    |                                          ^
//!    +------------------dispose-----------------+
//! ```
//!
//! Only a `Ready` renderer reacts to position events and pointer events.
//! `initialize` and `dispose` are both safe to repeat.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use herdmap_types::{Animal, HerdId, KeyPoint, LngLat, PositionEvent, Zone};
use tracing::{debug, info, trace, warn};

use crate::config::{MapConfig, StalePolicy};
use crate::feature::{Feature, FeatureCollection, FeatureId};
use crate::interaction::{PointerEvent, PointerKind, Popup};
use crate::style::{
    self, ANIMAL_LAYER, ANIMAL_SOURCE, DEFAULT_HERD_COLOR, HERD_COLOR_PROPERTY, KEY_POINT_MARKER,
    OCCUPANCY_PROPERTY, ZONE_FILL_LAYER, ZONE_SOURCE,
};
use crate::surface::{
    Camera, ClusterOptions, Control, Cursor, ListenerId, ListenerSpec, Marker, RenderSurface,
    SourceSpec,
};

/// Where a renderer is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, nothing drawn yet.
    #[default]
    Pending,
    /// Snapshot drawn; live updates are applied.
    Ready,
    /// Torn down; everything is ignored.
    Disposed,
}

/// Draws a farm snapshot onto a [`RenderSurface`] and keeps animal
/// positions current.
#[derive(Debug)]
pub struct MapRenderer<S> {
    surface: S,
    config: MapConfig,
    phase: Phase,
    animals: FeatureCollection,
    zones: FeatureCollection,
    /// Timestamp of the last update applied per animal, for
    /// [`StalePolicy::EventTime`].
    applied_at: HashMap<FeatureId, DateTime<Utc>>,
    listeners: Vec<ListenerId>,
}

impl<S: RenderSurface> MapRenderer<S> {
    /// Create a renderer over `surface`. Nothing is drawn until
    /// [`initialize`](Self::initialize).
    pub fn new(surface: S, config: MapConfig) -> Self {
        Self {
            surface,
            config,
            phase: Phase::Pending,
            animals: FeatureCollection::new(),
            zones: FeatureCollection::new(),
            applied_at: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Draw the snapshot: camera, controls, zones, key points and the
    /// clustered animal source with its layers.
    ///
    /// Returns `false` and draws nothing if the renderer is not pending.
    pub fn initialize(
        &mut self,
        animals: &[Animal],
        zones: &[Zone],
        key_points: &[KeyPoint],
    ) -> bool {
        match self.phase {
            Phase::Pending => {}
            Phase::Ready => {
                debug!("map already initialized");
                return false;
            }
            Phase::Disposed => {
                warn!("initialize called on a disposed map");
                return false;
            }
        }

        let center = animals
            .iter()
            .find_map(|a| a.last_location)
            .map_or(self.config.default_center, |p| p.coordinates);
        self.surface.set_camera(Camera {
            center,
            zoom: self.config.default_zoom,
        });
        for control in [Control::Navigation, Control::Scale, Control::Fullscreen] {
            self.surface.add_control(control);
        }

        self.zones = zone_features(zones, animals);
        self.surface.add_source(
            ZONE_SOURCE,
            SourceSpec {
                data: self.zones.clone(),
                cluster: None,
            },
        );
        self.surface.add_layer(style::zone_fill());
        self.surface.add_layer(style::zone_outline());

        for point in key_points {
            self.surface.add_marker(Marker {
                position: point.location.coordinates,
                color: KEY_POINT_MARKER.to_owned(),
                popup: Some(point.name.clone()),
            });
        }

        let drawn: Vec<&Animal> = animals
            .iter()
            .filter(|a| a.last_location.is_some())
            .filter(|a| herd_matches(self.config.herd_filter, a.herd_id))
            .collect();
        self.animals = drawn.iter().filter_map(|a| animal_feature(a)).collect();
        self.applied_at = drawn
            .iter()
            .filter_map(|a| Some((FeatureId::from(a.id), a.last_seen_at?)))
            .collect();
        self.surface.add_source(
            ANIMAL_SOURCE,
            SourceSpec {
                data: self.animals.clone(),
                cluster: Some(ClusterOptions {
                    max_zoom: self.config.cluster_max_zoom,
                    radius: self.config.cluster_radius,
                }),
            },
        );
        self.surface.add_layer(style::clusters());
        self.surface.add_layer(style::cluster_count());
        self.surface.add_layer(style::animals());

        for (layer, kind) in [
            (ZONE_FILL_LAYER, PointerKind::Click),
            (ANIMAL_LAYER, PointerKind::Click),
            (ANIMAL_LAYER, PointerKind::Enter),
            (ANIMAL_LAYER, PointerKind::Leave),
        ] {
            let id = self.surface.add_listener(ListenerSpec {
                layer: layer.to_owned(),
                kind,
            });
            self.listeners.push(id);
        }

        self.phase = Phase::Ready;
        info!(
            animals = self.animals.len(),
            zones = self.zones.len(),
            key_points = key_points.len(),
            "map initialized"
        );
        true
    }

    /// Move the animal named by `event` and redraw the animal source.
    ///
    /// Returns whether the event was applied. Unknown animals, events
    /// outside the `Ready` phase, and (under [`StalePolicy::EventTime`])
    /// events older than the last applied one are ignored.
    pub fn reconcile(&mut self, event: &PositionEvent) -> bool {
        if self.phase != Phase::Ready {
            trace!(animal_id = %event.entity_id, phase = ?self.phase, "position ignored");
            return false;
        }

        let id = FeatureId::from(event.entity_id);
        if self.config.stale_policy == StalePolicy::EventTime
            && self
                .applied_at
                .get(&id)
                .is_some_and(|last| event.timestamp < *last)
        {
            debug!(
                animal_id = %event.entity_id,
                timestamp = %event.timestamp,
                "stale position discarded"
            );
            return false;
        }

        if !self
            .animals
            .set_point(&id, LngLat::new(event.longitude, event.latitude))
        {
            trace!(animal_id = %event.entity_id, "position for an animal not on the map");
            return false;
        }
        self.applied_at.insert(id, event.timestamp);
        self.surface.set_source_data(ANIMAL_SOURCE, &self.animals);
        true
    }

    /// Answer a pointer event from the host.
    ///
    /// Clicking a zone or an animal yields a popup. Entering and leaving the
    /// animal layer switch the cursor.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Popup> {
        if self.phase != Phase::Ready {
            return None;
        }
        match (event.kind, event.layer.as_str()) {
            (PointerKind::Click, ZONE_FILL_LAYER) => self.zone_popup(event),
            (PointerKind::Click, ANIMAL_LAYER) => self.animal_popup(event),
            (PointerKind::Enter, ANIMAL_LAYER) => {
                self.surface.set_cursor(Cursor::Pointer);
                None
            }
            (PointerKind::Leave, ANIMAL_LAYER) => {
                self.surface.set_cursor(Cursor::Default);
                None
            }
            _ => None,
        }
    }

    /// Detach every listener and release the surface. Repeat calls do
    /// nothing.
    pub fn dispose(&mut self) {
        if self.phase == Phase::Disposed {
            return;
        }
        for id in self.listeners.drain(..) {
            self.surface.remove_listener(id);
        }
        self.surface.remove();
        self.animals.clear();
        self.zones.clear();
        self.applied_at.clear();
        self.phase = Phase::Disposed;
        debug!("map disposed");
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Animal features as currently drawn.
    pub const fn animals(&self) -> &FeatureCollection {
        &self.animals
    }

    /// The underlying surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    fn zone_popup(&self, event: &PointerEvent) -> Option<Popup> {
        let zone = self.zones.get(event.feature.as_ref()?)?;
        let area = zone.f64_property("area_ha").unwrap_or_default();
        let count = zone.u64_property(OCCUPANCY_PROPERTY).unwrap_or_default();
        Some(Popup {
            position: event.position,
            title: zone.str_property("name").unwrap_or_default().to_owned(),
            lines: vec![format!("{area} ha"), format!("{count} animals")],
            link: None,
        })
    }

    fn animal_popup(&self, event: &PointerEvent) -> Option<Popup> {
        let id = event.feature.as_ref()?;
        let animal = self.animals.get(id)?;
        let seen = animal
            .str_property("last_seen")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or_else(
                || String::from("No GPS fix yet"),
                |at| format!("Last seen {}", at.format("%Y-%m-%d %H:%M")),
            );
        Some(Popup {
            position: animal.geometry.as_point().unwrap_or(event.position),
            title: animal.str_property("name").unwrap_or_default().to_owned(),
            lines: vec![seen],
            link: Some(format!("/animals/{id}")),
        })
    }
}

fn herd_matches(filter: Option<HerdId>, herd: Option<HerdId>) -> bool {
    filter.is_none_or(|wanted| herd == Some(wanted))
}

fn animal_feature(animal: &Animal) -> Option<Feature> {
    let location = animal.last_location?;
    let last_seen = animal
        .last_seen_at
        .map_or(serde_json::Value::Null, |at| at.to_rfc3339().into());
    Some(
        Feature::new(animal.id, location)
            .with_property("name", animal.display_name())
            .with_property("ear_tag", animal.ear_tag.as_str())
            .with_property(
                HERD_COLOR_PROPERTY,
                animal.herd_color.as_deref().unwrap_or(DEFAULT_HERD_COLOR),
            )
            .with_property("last_seen", last_seen),
    )
}

/// Zone features with an occupancy count: the larger of the server's count
/// and the number of snapshot animals assigned to the zone.
fn zone_features(zones: &[Zone], animals: &[Animal]) -> FeatureCollection {
    zones
        .iter()
        .map(|zone| {
            let assigned = animals
                .iter()
                .filter(|a| a.zone_id == Some(zone.id))
                .count();
            let assigned = u32::try_from(assigned).unwrap_or(u32::MAX);
            let occupants = zone.animal_count.unwrap_or_default().max(assigned);
            Feature::new(zone.id, zone.geometry.clone())
                .with_property("name", zone.name.as_str())
                .with_property("area_ha", zone.area_ha)
                .with_property(OCCUPANCY_PROPERTY, occupants)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone as _;
    use herdmap_types::{
        AnimalId, AnimalStatus, FarmId, KeyPointIcon, KeyPointId, Point, Polygon, ZoneId,
    };

    use super::*;
    use crate::HeadlessSurface;
    use crate::style::{CLUSTER_COUNT_LAYER, CLUSTER_LAYER, ZONE_OUTLINE_LAYER};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }

    fn animal(name: &str, location: Option<(f64, f64)>) -> Animal {
        Animal {
            id: AnimalId::new(),
            farm_id: FarmId::default(),
            herd_id: None,
            zone_id: None,
            ear_tag: format!("BR-{name}"),
            name: Some(name.to_owned()),
            status: AnimalStatus::Active,
            last_location: location.map(|(lng, lat)| Point::new(lng, lat)),
            last_seen_at: location.map(|_| at(0)),
            herd_color: None,
        }
    }

    fn zone(name: &str, animal_count: Option<u32>) -> Zone {
        Zone {
            id: ZoneId::new(),
            farm_id: FarmId::default(),
            name: name.to_owned(),
            geometry: Polygon::from_ring(vec![
                LngLat::new(-55.02, -20.22),
                LngLat::new(-55.00, -20.22),
                LngLat::new(-55.00, -20.20),
                LngLat::new(-55.02, -20.22),
            ]),
            area_ha: 12.5,
            is_active: true,
            animal_count,
        }
    }

    fn key_point(name: &str) -> KeyPoint {
        KeyPoint {
            id: KeyPointId::new(),
            farm_id: FarmId::default(),
            name: name.to_owned(),
            icon: KeyPointIcon::Water,
            location: Point::new(-55.005, -20.205),
            is_active: true,
        }
    }

    fn position(animal: &Animal, lng: f64, lat: f64, timestamp: DateTime<Utc>) -> PositionEvent {
        PositionEvent {
            entity_id: animal.id,
            latitude: lat,
            longitude: lng,
            timestamp,
            speed_kmh: None,
            battery: None,
        }
    }

    fn point_of(renderer: &MapRenderer<HeadlessSurface>, animal: &Animal) -> LngLat {
        renderer
            .animals()
            .get(&FeatureId::from(animal.id))
            .unwrap()
            .geometry
            .as_point()
            .unwrap()
    }

    fn ready(animals: &[Animal], config: MapConfig) -> MapRenderer<HeadlessSurface> {
        let mut renderer = MapRenderer::new(HeadlessSurface::new(), config);
        assert!(renderer.initialize(animals, &[zone("North", None)], &[key_point("Trough")]));
        renderer
    }

    #[test]
    fn initialize_draws_snapshot() {
        let a1 = animal("A1", Some((-55.0, -20.2)));
        let unplaced = animal("Ghost", None);
        let renderer = ready(&[a1.clone(), unplaced.clone()], MapConfig::default());
        let surface = renderer.surface();

        let layer_ids: Vec<&str> = surface.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(
            layer_ids,
            vec![
                ZONE_FILL_LAYER,
                ZONE_OUTLINE_LAYER,
                CLUSTER_LAYER,
                CLUSTER_COUNT_LAYER,
                ANIMAL_LAYER
            ]
        );
        let animals = surface.source(ANIMAL_SOURCE).unwrap();
        assert_eq!(animals.data.len(), 1, "animals without a fix are not drawn");
        assert!(!animals.data.contains(&FeatureId::from(unplaced.id)));
        assert_eq!(
            animals.cluster,
            Some(ClusterOptions {
                max_zoom: 14,
                radius: 40
            })
        );
        assert_eq!(surface.source(ZONE_SOURCE).unwrap().data.len(), 1);

        assert_eq!(surface.markers().len(), 1);
        assert_eq!(surface.markers()[0].color, KEY_POINT_MARKER);
        assert_eq!(surface.markers()[0].popup.as_deref(), Some("Trough"));

        assert_eq!(
            surface.controls(),
            &[Control::Navigation, Control::Scale, Control::Fullscreen]
        );
        assert_eq!(surface.camera().unwrap().center, LngLat::new(-55.0, -20.2));
        assert_eq!(surface.listeners().count(), 4);

        let feature = animals.data.get(&FeatureId::from(a1.id)).unwrap();
        assert_eq!(feature.str_property(HERD_COLOR_PROPERTY), Some(DEFAULT_HERD_COLOR));
        assert_eq!(feature.str_property("name"), Some("A1"));
    }

    #[test]
    fn camera_falls_back_to_configured_center() {
        let config = MapConfig {
            default_center: LngLat::new(-47.9, -15.8),
            default_zoom: 10.0,
            ..MapConfig::default()
        };
        let renderer = ready(&[animal("Ghost", None)], config);
        let camera = renderer.surface().camera().unwrap();
        assert_eq!(camera.center, LngLat::new(-47.9, -15.8));
        assert_eq!(camera.zoom, 10.0);
    }

    #[test]
    fn second_initialize_draws_nothing() {
        let mut renderer = ready(&[animal("A1", Some((-55.0, -20.2)))], MapConfig::default());
        let layers = renderer.surface().layers().len();
        let markers = renderer.surface().markers().len();

        assert!(!renderer.initialize(&[animal("A9", Some((1.0, 1.0)))], &[], &[key_point("x")]));
        assert_eq!(renderer.surface().layers().len(), layers);
        assert_eq!(renderer.surface().markers().len(), markers);
        assert_eq!(renderer.animals().len(), 1);
        assert_eq!(renderer.surface().listeners().count(), 4);
    }

    #[test]
    fn reconcile_moves_only_the_named_animal() {
        let a1 = animal("A1", Some((-55.0, -20.2)));
        let a2 = animal("A2", Some((-55.1, -20.3)));
        let mut renderer = ready(&[a1.clone(), a2.clone()], MapConfig::default());

        assert!(renderer.reconcile(&position(&a1, -55.01, -20.21, at(1))));

        assert_eq!(point_of(&renderer, &a1), LngLat::new(-55.01, -20.21));
        assert_eq!(point_of(&renderer, &a2), LngLat::new(-55.1, -20.3));
        let surface = renderer.surface();
        assert_eq!(surface.source(ANIMAL_SOURCE).unwrap().redraws, 1);
        assert_eq!(surface.source(ZONE_SOURCE).unwrap().redraws, 0);
        let drawn = &surface.source(ANIMAL_SOURCE).unwrap().data;
        assert_eq!(
            drawn.get(&FeatureId::from(a1.id)).unwrap().geometry.as_point(),
            Some(LngLat::new(-55.01, -20.21))
        );
        assert_eq!(drawn.len(), 2);
    }

    #[test]
    fn unknown_animal_changes_nothing() {
        let a1 = animal("A1", Some((-55.0, -20.2)));
        let stranger = animal("Stranger", Some((0.0, 0.0)));
        let mut renderer = ready(&[a1.clone()], MapConfig::default());
        let before = renderer.animals().clone();

        assert!(!renderer.reconcile(&position(&stranger, 1.0, 1.0, at(1))));
        assert_eq!(renderer.animals(), &before);
        assert_eq!(renderer.surface().source(ANIMAL_SOURCE).unwrap().redraws, 0);
    }

    #[test]
    fn animal_without_initial_fix_stays_off_the_map() {
        let ghost = animal("Ghost", None);
        let mut renderer = ready(&[ghost.clone()], MapConfig::default());
        assert!(!renderer.reconcile(&position(&ghost, 1.0, 1.0, at(1))));
        assert!(renderer.animals().is_empty());
    }

    #[test]
    fn last_arrival_wins_by_default() {
        let a1 = animal("A1", Some((-55.0, -20.2)));
        let mut renderer = ready(&[a1.clone()], MapConfig::default());

        assert!(renderer.reconcile(&position(&a1, -55.02, -20.22, at(5))));
        assert!(renderer.reconcile(&position(&a1, -55.01, -20.21, at(3))));

        assert_eq!(point_of(&renderer, &a1), LngLat::new(-55.01, -20.21));
        assert_eq!(renderer.surface().source(ANIMAL_SOURCE).unwrap().redraws, 2);
    }

    #[test]
    fn event_time_policy_discards_older_updates() {
        let a1 = animal("A1", Some((-55.0, -20.2)));
        let config = MapConfig {
            stale_policy: StalePolicy::EventTime,
            ..MapConfig::default()
        };
        let mut renderer = ready(&[a1.clone()], config);

        assert!(renderer.reconcile(&position(&a1, -55.02, -20.22, at(5))));
        assert!(!renderer.reconcile(&position(&a1, -55.01, -20.21, at(3))));
        assert_eq!(point_of(&renderer, &a1), LngLat::new(-55.02, -20.22));

        // Equal timestamps are not stale.
        assert!(renderer.reconcile(&position(&a1, -55.03, -20.23, at(5))));
    }

    #[test]
    fn event_time_policy_respects_snapshot_fix_time() {
        let a1 = animal("A1", Some((-55.0, -20.2)));
        let config = MapConfig {
            stale_policy: StalePolicy::EventTime,
            ..MapConfig::default()
        };
        let mut renderer = ready(&[a1.clone()], config);
        let before_snapshot = Utc.with_ymd_and_hms(2026, 3, 1, 11, 0, 0).unwrap();
        assert!(!renderer.reconcile(&position(&a1, 1.0, 1.0, before_snapshot)));
    }

    #[test]
    fn events_outside_ready_phase_are_ignored() {
        let a1 = animal("A1", Some((-55.0, -20.2)));
        let mut renderer = MapRenderer::new(HeadlessSurface::new(), MapConfig::default());
        assert!(!renderer.reconcile(&position(&a1, 1.0, 1.0, at(1))));
        assert_eq!(renderer.phase(), Phase::Pending);

        renderer.initialize(&[a1.clone()], &[], &[]);
        renderer.dispose();
        assert!(!renderer.reconcile(&position(&a1, 1.0, 1.0, at(2))));
        assert_eq!(renderer.surface().source(ANIMAL_SOURCE).unwrap().redraws, 0);
    }

    #[test]
    fn dispose_is_idempotent_and_detaches_listeners() {
        let mut renderer = ready(&[animal("A1", Some((-55.0, -20.2)))], MapConfig::default());
        renderer.dispose();
        renderer.dispose();

        assert_eq!(renderer.phase(), Phase::Disposed);
        assert!(renderer.surface().is_removed());
        assert_eq!(renderer.surface().listeners().count(), 0);
        assert!(!renderer.initialize(&[], &[], &[]));
    }

    #[test]
    fn dispose_before_initialize_releases_surface() {
        let mut renderer = MapRenderer::new(HeadlessSurface::new(), MapConfig::default());
        renderer.dispose();
        assert!(renderer.surface().is_removed());
        assert!(renderer.surface().layers().is_empty());
    }

    #[test]
    fn zone_occupancy_counts_server_and_assigned_animals() {
        let empty = zone("Empty", None);
        let counted = zone("Counted", Some(3));
        let assigned = zone("Assigned", None);
        let mut cow = animal("A1", Some((-55.0, -20.2)));
        cow.zone_id = Some(assigned.id);

        let mut renderer = MapRenderer::new(HeadlessSurface::new(), MapConfig::default());
        renderer.initialize(&[cow], &[empty.clone(), counted.clone(), assigned.clone()], &[]);

        let zones = &renderer.surface().source(ZONE_SOURCE).unwrap().data;
        let count = |z: &Zone| {
            zones
                .get(&FeatureId::from(z.id))
                .unwrap()
                .u64_property(OCCUPANCY_PROPERTY)
        };
        assert_eq!(count(&empty), Some(0));
        assert_eq!(count(&counted), Some(3));
        assert_eq!(count(&assigned), Some(1));
    }

    #[test]
    fn herd_filter_limits_drawn_animals() {
        let herd = HerdId::new();
        let mut ours = animal("Ours", Some((-55.0, -20.2)));
        ours.herd_id = Some(herd);
        ours.herd_color = Some(String::from("#3b82f6"));
        let theirs = animal("Theirs", Some((-55.1, -20.3)));
        let config = MapConfig {
            herd_filter: Some(herd),
            ..MapConfig::default()
        };
        let mut renderer = ready(&[ours.clone(), theirs.clone()], config);

        assert_eq!(renderer.animals().len(), 1);
        let drawn = renderer.animals().get(&FeatureId::from(ours.id)).unwrap();
        assert_eq!(drawn.str_property(HERD_COLOR_PROPERTY), Some("#3b82f6"));
        assert!(!renderer.reconcile(&position(&theirs, 1.0, 1.0, at(1))));
    }

    #[test]
    fn clicking_a_zone_shows_its_details() {
        let north = zone("North", Some(2));
        let mut renderer = MapRenderer::new(HeadlessSurface::new(), MapConfig::default());
        renderer.initialize(&[], &[north.clone()], &[]);

        let popup = renderer
            .handle_pointer(&PointerEvent {
                kind: PointerKind::Click,
                layer: ZONE_FILL_LAYER.to_owned(),
                feature: Some(FeatureId::from(north.id)),
                position: LngLat::new(-55.01, -20.21),
            })
            .unwrap();
        assert_eq!(popup.title, "North");
        assert_eq!(popup.lines, vec!["12.5 ha", "2 animals"]);
        assert_eq!(popup.position, LngLat::new(-55.01, -20.21));
        assert!(popup.link.is_none());
    }

    #[test]
    fn clicking_an_animal_links_to_its_page() {
        let a1 = animal("Mimosa", Some((-55.0, -20.2)));
        let mut renderer = ready(&[a1.clone()], MapConfig::default());

        let popup = renderer
            .handle_pointer(&PointerEvent {
                kind: PointerKind::Click,
                layer: ANIMAL_LAYER.to_owned(),
                feature: Some(FeatureId::from(a1.id)),
                position: LngLat::new(0.0, 0.0),
            })
            .unwrap();
        assert_eq!(popup.title, "Mimosa");
        assert_eq!(popup.lines, vec!["Last seen 2026-03-01 12:00"]);
        assert_eq!(popup.link, Some(format!("/animals/{}", a1.id)));
        assert_eq!(popup.position, LngLat::new(-55.0, -20.2));
    }

    #[test]
    fn hovering_animals_switches_cursor() {
        let mut renderer = ready(&[animal("A1", Some((-55.0, -20.2)))], MapConfig::default());
        let hover = |kind| PointerEvent {
            kind,
            layer: ANIMAL_LAYER.to_owned(),
            feature: None,
            position: LngLat::new(0.0, 0.0),
        };

        assert!(renderer.handle_pointer(&hover(PointerKind::Enter)).is_none());
        assert_eq!(renderer.surface().cursor(), Cursor::Pointer);
        assert!(renderer.handle_pointer(&hover(PointerKind::Leave)).is_none());
        assert_eq!(renderer.surface().cursor(), Cursor::Default);
    }

    #[test]
    fn clicks_elsewhere_produce_no_popup() {
        let mut renderer = ready(&[animal("A1", Some((-55.0, -20.2)))], MapConfig::default());
        let popup = renderer.handle_pointer(&PointerEvent {
            kind: PointerKind::Click,
            layer: CLUSTER_LAYER.to_owned(),
            feature: None,
            position: LngLat::new(0.0, 0.0),
        });
        assert!(popup.is_none());
    }
}
