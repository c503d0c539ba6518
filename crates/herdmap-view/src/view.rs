//! The live farm map view.
//!
//! Mounting runs four steps in a fixed order:
//!
//! 1. Fetch the snapshot (animals, zones, key points)
//! 2. Draw it with a fresh [`MapRenderer`]
//! 3. Register the event handler that forwards position updates to
//!    [`MapRenderer::reconcile`]
//! 4. Open the stream for the farm context
//!
//! Unmounting closes the stream before disposing the renderer, so no
//! update can land on a torn-down surface. The renderer sits behind a
//! mutex shared only by the stream handler and the view itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use herdmap_map::{MapRenderer, PointerEvent, Popup, RenderSurface};
use herdmap_stream::{ConnectionManager, ConnectionState, Connector};
use herdmap_types::{AlertEvent, StreamEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::snapshot::SnapshotSource;

/// Errors from mounting a view.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The snapshot source failed; nothing was drawn or connected.
    #[error("failed to fetch map snapshot: {source}")]
    Snapshot {
        /// The source's error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Counts of what the stream delivered to a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewStats {
    /// Position updates applied to the map.
    pub positions_applied: u64,
    /// Position updates ignored (unknown animal, stale, or after dispose).
    pub positions_ignored: u64,
    /// Alerts received.
    pub alerts: u64,
    /// Other events received.
    pub other_events: u64,
}

#[derive(Debug, Default)]
struct Counters {
    applied: AtomicU64,
    ignored: AtomicU64,
    alerts: AtomicU64,
    other: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ViewStats {
        ViewStats {
            positions_applied: self.applied.load(Ordering::Relaxed),
            positions_ignored: self.ignored.load(Ordering::Relaxed),
            alerts: self.alerts.load(Ordering::Relaxed),
            other_events: self.other.load(Ordering::Relaxed),
        }
    }
}

/// A mounted live map for one farm.
pub struct FarmMapView<S: RenderSurface, C: Connector> {
    renderer: Arc<Mutex<MapRenderer<S>>>,
    manager: ConnectionManager<C>,
    counters: Arc<Counters>,
    mounted: bool,
}

impl<S, C> FarmMapView<S, C>
where
    S: RenderSurface + 'static,
    C: Connector,
{
    /// Mount a view for `context_id` over `surface`.
    ///
    /// Alerts are forwarded to `alerts` when given; a full or closed
    /// channel drops the alert with a warning.
    pub async fn mount<Src: SnapshotSource>(
        source: &Src,
        surface: S,
        connector: C,
        config: &DashboardConfig,
        context_id: &str,
        alerts: Option<mpsc::Sender<AlertEvent>>,
    ) -> Result<Self, ViewError> {
        let snapshot = source
            .fetch()
            .await
            .map_err(|e| ViewError::Snapshot { source: Box::new(e) })?;

        let mut renderer = MapRenderer::new(surface, config.map.clone());
        renderer.initialize(&snapshot.animals, &snapshot.zones, &snapshot.key_points);
        let renderer = Arc::new(Mutex::new(renderer));

        let counters = Arc::new(Counters::default());
        let mut manager = ConnectionManager::new(connector, config.stream.clone());
        manager.on_event(event_handler(
            Arc::clone(&renderer),
            Arc::clone(&counters),
            alerts,
        ));
        manager.open(context_id);

        info!(
            farm_id = context_id,
            animals = snapshot.animals.len(),
            zones = snapshot.zones.len(),
            key_points = snapshot.key_points.len(),
            "map view mounted"
        );
        Ok(Self {
            renderer,
            manager,
            counters,
            mounted: true,
        })
    }

    /// Close the stream, then dispose the map. Repeat calls do nothing.
    pub fn unmount(&mut self) -> ViewStats {
        if self.mounted {
            self.manager.close();
            lock(&self.renderer).dispose();
            self.mounted = false;
            let stats = self.counters.snapshot();
            info!(
                applied = stats.positions_applied,
                ignored = stats.positions_ignored,
                alerts = stats.alerts,
                "map view unmounted"
            );
        }
        self.counters.snapshot()
    }

    /// Forward a pointer event from the host to the map.
    pub fn handle_pointer(&self, event: &PointerEvent) -> Option<Popup> {
        lock(&self.renderer).handle_pointer(event)
    }

    /// Inspect the renderer.
    pub fn with_renderer<R>(&self, f: impl FnOnce(&MapRenderer<S>) -> R) -> R {
        f(&lock(&self.renderer))
    }

    /// Current stream connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Subscribe to stream connection state changes.
    pub fn watch_state(&self) -> tokio::sync::watch::Receiver<ConnectionState> {
        self.manager.watch_state()
    }

    /// Event counts so far.
    pub fn stats(&self) -> ViewStats {
        self.counters.snapshot()
    }

    /// Whether the view is still mounted.
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl<S: RenderSurface, C: Connector> Drop for FarmMapView<S, C> {
    fn drop(&mut self) {
        if self.mounted {
            self.manager.close();
            lock(&self.renderer).dispose();
        }
    }
}

fn lock<S>(renderer: &Mutex<MapRenderer<S>>) -> MutexGuard<'_, MapRenderer<S>> {
    renderer.lock().unwrap_or_else(PoisonError::into_inner)
}

fn event_handler<S: RenderSurface>(
    renderer: Arc<Mutex<MapRenderer<S>>>,
    counters: Arc<Counters>,
    alerts: Option<mpsc::Sender<AlertEvent>>,
) -> impl Fn(&StreamEvent) + Send + Sync + 'static
where
    S: 'static,
{
    move |event| match event {
        StreamEvent::PositionUpdate(position) => {
            let counter = if lock(&renderer).reconcile(position) {
                &counters.applied
            } else {
                &counters.ignored
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
        StreamEvent::Alert(alert) => {
            counters.alerts.fetch_add(1, Ordering::Relaxed);
            let Some(tx) = &alerts else {
                debug!(
                    alert_type = %alert.alert_type,
                    message = %alert.message,
                    "alert received"
                );
                return;
            };
            if let Err(e) = tx.try_send(alert.clone()) {
                warn!(alert_type = %alert.alert_type, error = %e, "alert dropped");
            }
        }
        StreamEvent::Status(status) => {
            counters.other.fetch_add(1, Ordering::Relaxed);
            debug!(?status, "device status received");
        }
    }
}
