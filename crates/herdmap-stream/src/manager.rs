//! The connection manager: one live stream per farm context.
//!
//! [`ConnectionManager::open`] spawns a session task that owns the socket
//! and its retry timer. The task runs this loop until cancelled:
//!
//! 1. Dial `<url>?farm_id=<context>` via the [`Connector`]
//! 2. On success, pull frames and dispatch each decoded event to every
//!    registered handler, in arrival order
//! 3. On any abnormal end (refused dial, dropped socket, transport error),
//!    wait the fixed reconnect delay and go back to 1
//!
//! [`ConnectionManager::close`] cancels the task's [`CancellationToken`],
//! which every dial, read and sleep is raced against, so no connection
//! attempt can start after `close` returns.
//!
//! Frames that do not decode, or that belong to another farm, are dropped
//! without reaching any handler.

use std::sync::{Arc, PoisonError, RwLock};

use herdmap_types::{StreamEvent, decode_envelope};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::StreamConfig;
use crate::state::ConnectionState;
use crate::transport::{Connector, Transport};

/// Callback invoked once per decoded inbound event.
pub type EventHandler = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

type HandlerList = Arc<RwLock<Vec<EventHandler>>>;

/// Owns one streaming connection and its reconnect loop.
///
/// A manager is bound to at most one farm context at a time. Switching
/// farms means `close()` followed by `open()` with the new context; there
/// is no in-place retargeting of a live session.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    config: StreamConfig,
    handlers: HandlerList,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    session: Option<Session>,
}

/// Handle to a running session task.
struct Session {
    context_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Everything the session task needs, moved into it on spawn.
struct SessionContext<C: Connector> {
    connector: Arc<C>,
    url: String,
    context_id: String,
    reconnect_delay: std::time::Duration,
    handlers: HandlerList,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
}

/// How a connected session ended.
enum SessionEnd {
    /// `close()` was called.
    Cancelled,
    /// The peer dropped or the transport failed.
    Dropped,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager that dials through `connector`.
    pub fn new(connector: C, config: StreamConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector: Arc::new(connector),
            config,
            handlers: Arc::new(RwLock::new(Vec::new())),
            state_tx: Arc::new(state_tx),
            session: None,
        }
    }

    /// Register a callback invoked once per decoded inbound event.
    ///
    /// Handlers run on the session task, in registration order, before the
    /// next frame is read.
    pub fn on_event<F>(&self, handler: F)
    where
        F: Fn(&StreamEvent) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Start streaming for `context_id`.
    ///
    /// Never fails: connection problems are logged and retried. An empty
    /// context is a no-op, and so is calling `open` while a session is
    /// already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self, context_id: &str) {
        if context_id.is_empty() {
            debug!("open called without a farm context, ignoring");
            return;
        }
        if let Some(session) = self.session.as_ref().filter(|s| !s.task.is_finished()) {
            warn!(
                open_context = session.context_id,
                requested_context = context_id,
                "stream already open, ignoring open"
            );
            return;
        }

        let cancel = CancellationToken::new();
        let ctx = SessionContext {
            connector: Arc::clone(&self.connector),
            url: self.config.endpoint(context_id),
            context_id: context_id.to_owned(),
            reconnect_delay: self.config.reconnect_delay(),
            handlers: Arc::clone(&self.handlers),
            state_tx: Arc::clone(&self.state_tx),
            cancel: cancel.clone(),
        };
        info!(farm_id = context_id, url = ctx.url, "opening live stream");
        let task = tokio::spawn(run_session(ctx));

        self.session = Some(Session {
            context_id: context_id.to_owned(),
            cancel,
            task,
        });
    }

    /// Stop streaming: cancel any pending retry and end the live connection.
    ///
    /// Returns immediately without waiting for the session task. Safe to
    /// call any number of times.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel.cancel();
            info!(farm_id = session.context_id, "live stream closed");
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Farm context of the running session, if any.
    pub fn context_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.context_id.as_str())
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel.cancel();
        }
    }
}

impl<C: Connector> SessionContext<C> {
    /// Publish a state change unless the session has been cancelled.
    ///
    /// After cancellation `close()` owns the state, and a late write from
    /// a finishing task must not overwrite it.
    fn set_state(&self, state: ConnectionState) {
        if !self.cancel.is_cancelled() {
            self.state_tx.send_replace(state);
        }
    }
}

/// Connect, pump, and reconnect until cancelled.
async fn run_session<C: Connector>(ctx: SessionContext<C>) {
    let mut attempt: u64 = 0;
    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }
        attempt = attempt.saturating_add(1);
        ctx.set_state(ConnectionState::Connecting);

        let connected = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            result = ctx.connector.connect(&ctx.url) => result,
        };

        match connected {
            Ok(mut transport) => {
                ctx.set_state(ConnectionState::Connected);
                info!(farm_id = ctx.context_id, attempt, "live stream connected");
                match pump(&ctx, &mut transport).await {
                    SessionEnd::Cancelled => {
                        transport.close().await;
                        break;
                    }
                    SessionEnd::Dropped => {
                        warn!(
                            farm_id = ctx.context_id,
                            retry_in = ?ctx.reconnect_delay,
                            "live stream dropped, reconnecting"
                        );
                    }
                }
            }
            Err(e) => {
                warn!(
                    farm_id = ctx.context_id,
                    attempt,
                    error = %e,
                    retry_in = ?ctx.reconnect_delay,
                    "live stream connect failed"
                );
            }
        }

        ctx.set_state(ConnectionState::RetryPending);
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            () = tokio::time::sleep(ctx.reconnect_delay) => {}
        }
    }
    debug!(farm_id = ctx.context_id, "live stream session finished");
}

/// Read frames until the connection ends or the session is cancelled.
async fn pump<C: Connector>(ctx: &SessionContext<C>, transport: &mut C::Transport) -> SessionEnd {
    loop {
        let frame = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => return SessionEnd::Cancelled,
            frame = transport.next_frame() => frame,
        };
        match frame {
            Some(Ok(text)) => dispatch(ctx, &text),
            Some(Err(e)) => {
                debug!(error = %e, "live stream transport error");
                return SessionEnd::Dropped;
            }
            None => return SessionEnd::Dropped,
        }
    }
}

/// Decode one frame and hand it to every handler.
fn dispatch<C: Connector>(ctx: &SessionContext<C>, text: &str) {
    let envelope = match decode_envelope(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, "dropping malformed stream message");
            return;
        }
    };
    // Farm ids are UUIDs; the server may echo them in another case.
    if !envelope.farm_id.eq_ignore_ascii_case(&ctx.context_id) {
        debug!(
            farm_id = envelope.farm_id,
            expected = ctx.context_id,
            "dropping stream message for another farm"
        );
        return;
    }
    let event = match envelope.into_event() {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "dropping malformed stream message");
            return;
        }
    };

    // Snapshot the list so a handler may register another without deadlock.
    let handlers: Vec<EventHandler> = ctx
        .handlers
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    trace!(kind = ?event.kind(), handlers = handlers.len(), "dispatching stream event");
    for handler in &handlers {
        handler(&event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use herdmap_types::EventKind;

    use super::*;
    use crate::transport::memory::MemoryConnector;

    const FARM: &str = "16fd2706-8baf-433b-82eb-8c7fada847da";
    const ANIMAL: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    fn gps_frame(farm: &str, lng: f64, lat: f64) -> String {
        format!(
            r#"{{"type":"gps_update","farm_id":"{farm}","animal_id":"{ANIMAL}",
                "payload":{{"animal_id":"{ANIMAL}","lat":{lat},"lng":{lng},
                "speed_kmh":1.0,"battery":90,"timestamp":"2026-03-01T12:00:00Z"}}}}"#
        )
    }

    fn manager(connector: &MemoryConnector) -> ConnectionManager<MemoryConnector> {
        ConnectionManager::new(connector.clone(), StreamConfig::default())
    }

    fn collect(manager: &ConnectionManager<MemoryConnector>) -> Arc<Mutex<Vec<StreamEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.on_event(move |event| sink.lock().unwrap().push(event.clone()));
        seen
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn empty_context_is_a_no_op() {
        let connector = MemoryConnector::new();
        let mut manager = manager(&connector);
        manager.open("");
        settle().await;
        assert_eq!(connector.attempts(), 0);
        assert!(manager.context_id().is_none());
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn dials_endpoint_scoped_to_context() {
        let connector = MemoryConnector::new();
        let _feed = connector.accept_next();
        let mut manager = manager(&connector);
        manager.open(FARM);
        settle().await;
        assert_eq!(
            connector.dialed(),
            vec![format!("ws://localhost:8080/api/v1/ws?farm_id={FARM}")]
        );
        assert_eq!(manager.state(), ConnectionState::Connected);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn events_reach_handlers_in_arrival_order() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        let seen = collect(&manager);
        manager.open(FARM);

        feed.send(gps_frame(FARM, -55.01, -20.21));
        feed.send(gps_frame(FARM, -55.02, -20.22));
        settle().await;

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        let longitudes: Vec<f64> = seen
            .iter()
            .filter_map(|e| match e {
                StreamEvent::PositionUpdate(p) => Some(p.longitude),
                _ => None,
            })
            .collect();
        assert_eq!(longitudes, vec![-55.01, -55.02]);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_and_foreign_messages_are_dropped() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        let seen = collect(&manager);
        manager.open(FARM);

        feed.send("not json");
        feed.send(r#"{"type":"weather","farm_id":"x","payload":{}}"#);
        feed.send(format!(r#"{{"type":"gps_update","farm_id":"{FARM}","payload":{{}}}}"#));
        feed.send(gps_frame("another-farm", 1.0, 1.0));
        feed.send(format!(
            r#"{{"type":"alert","farm_id":"{FARM}","payload":{{"type":"device_offline","message":"collar 7 offline"}}}}"#
        ));
        settle().await;

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.first().map(StreamEvent::kind), Some(EventKind::Alert));
        // Dropped messages do not disturb the connection.
        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(connector.attempts(), 1);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn farm_match_ignores_uuid_case() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        let seen = collect(&manager);
        manager.open(&FARM.to_ascii_uppercase());

        feed.send(gps_frame(FARM, -55.01, -20.21));
        settle().await;

        assert_eq!(seen.lock().unwrap().len(), 1);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn every_handler_sees_every_event() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        let first = collect(&manager);
        let second = collect(&manager);
        manager.open(FARM);
        feed.send(gps_frame(FARM, 0.0, 0.0));
        settle().await;
        assert_eq!(first.lock().unwrap().len(), 1);
        assert_eq!(second.lock().unwrap().len(), 1);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn open_then_close_makes_no_attempt() {
        let connector = MemoryConnector::new();
        let mut manager = manager(&connector);
        manager.open(FARM);
        manager.close();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.attempts(), 0);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn close_while_connected_ends_connection_without_retry() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        manager.open(FARM);
        settle().await;
        assert_eq!(connector.attempts(), 1);

        manager.close();
        settle().await;
        assert!(feed.is_closed());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.attempts(), 1);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn abnormal_close_reconnects_once_after_fixed_delay() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        manager.open(FARM);
        settle().await;
        assert_eq!(connector.attempts(), 1);

        // Simulated abrupt close.
        drop(feed);
        settle().await;
        assert_eq!(manager.state(), ConnectionState::RetryPending);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(connector.attempts(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(connector.attempts(), 2);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn close_during_retry_delay_cancels_reconnect() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        manager.open(FARM);
        settle().await;

        drop(feed);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(manager.state(), ConnectionState::RetryPending);
        manager.close();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.attempts(), 1);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn refused_connects_retry_at_fixed_interval() {
        let connector = MemoryConnector::new();
        let mut manager = manager(&connector);
        manager.open(FARM);
        settle().await;
        assert_eq!(connector.attempts(), 1);

        // Three more delays, three more attempts: no backoff growth.
        tokio::time::sleep(Duration::from_millis(9000)).await;
        assert_eq!(connector.attempts(), 4);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn second_open_while_running_is_ignored() {
        let connector = MemoryConnector::new();
        let _feed = connector.accept_next();
        let mut manager = manager(&connector);
        manager.open(FARM);
        manager.open("some-other-farm");
        settle().await;
        assert_eq!(connector.attempts(), 1);
        assert_eq!(manager.context_id(), Some(FARM));
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn reopen_after_close_starts_a_new_session() {
        let connector = MemoryConnector::new();
        let _first = connector.accept_next();
        let second = connector.accept_next();
        let mut manager = manager(&connector);
        let seen = collect(&manager);

        manager.open(FARM);
        settle().await;
        manager.close();
        manager.open(FARM);
        settle().await;

        assert_eq!(connector.attempts(), 2);
        second.send(gps_frame(FARM, 3.0, 4.0));
        settle().await;
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(manager.state(), ConnectionState::Connected);
        manager.close();
    }

    #[tokio::test(start_paused = true)]
    async fn state_changes_are_observable() {
        let connector = MemoryConnector::new();
        let feed = connector.accept_next();
        let mut manager = manager(&connector);
        let mut rx = manager.watch_state();
        manager.open(FARM);
        rx.wait_for(|s| s.is_live()).await.unwrap();
        drop(feed);
        rx.wait_for(|s| *s == ConnectionState::RetryPending)
            .await
            .unwrap();
        manager.close();
        assert_eq!(*rx.borrow(), ConnectionState::Disconnected);
    }
}
