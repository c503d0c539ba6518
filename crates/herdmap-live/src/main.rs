//! Headless live map runner for Herdmap.
//!
//! Mounts the farm map view over a recording surface, follows the live
//! stream, and logs alerts and connection changes until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `herdmap-config.yaml`
//! 3. Load the session and pick the farm
//! 4. Build the REST client and mount the view
//! 5. Wait for Ctrl-C, then unmount and log the final counts

mod error;

use std::path::PathBuf;

use clap::Parser;
use herdmap_map::HeadlessSurface;
use herdmap_stream::WsConnector;
use herdmap_types::FarmId;
use herdmap_view::{ApiClient, DashboardConfig, FarmMapView, Session, SessionStore};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::LiveError;

/// Capacity of the alert channel between the stream handler and the log loop.
const ALERT_BUFFER: usize = 64;

/// Follow a farm's live map from the terminal.
#[derive(Parser, Debug)]
#[command(name = "herdmap-live", version)]
struct Cli {
    /// Dashboard configuration file
    #[arg(long, default_value = "herdmap-config.yaml")]
    config: PathBuf,

    /// Farm to follow; overrides the farm selected in the session
    #[arg(long, env = "HERDMAP_FARM_ID")]
    farm: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the session, or mounting the view
/// fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);
    info!("herdmap-live starting");
    run(&cli).await?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: &Cli) -> Result<(), LiveError> {
    let config = DashboardConfig::load_or_default(&cli.config)?;
    info!(
        api_url = config.api.base_url,
        ws_url = config.stream.url,
        reconnect_delay_ms = config.stream.reconnect_delay_ms,
        "configuration loaded"
    );

    let session = SessionStore::new(config.session.path.clone()).load()?;
    let farm_id = resolve_farm(cli.farm.as_deref(), &session)?.to_string();
    if !session.is_authenticated() {
        warn!("session has no access token; API requests will be unauthenticated");
    }

    let api = ApiClient::new(&config.api, session.access_token.clone())?;
    let (alert_tx, mut alert_rx) = mpsc::channel(ALERT_BUFFER);
    let mut view = FarmMapView::mount(
        &api,
        HeadlessSurface::new(),
        WsConnector::new(),
        &config,
        &farm_id,
        Some(alert_tx),
    )
    .await?;

    let mut state = view.watch_state();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(LiveError::Signal)?;
                info!("shutdown requested");
                break;
            }
            Some(alert) = alert_rx.recv() => {
                warn!(
                    animal_id = alert.animal_id.as_deref().unwrap_or("-"),
                    alert_type = %alert.alert_type,
                    message = %alert.message,
                    "farm alert"
                );
            }
            Ok(()) = state.changed() => {
                let current = *state.borrow_and_update();
                info!(state = ?current, "stream state changed");
            }
        }
    }

    let stats = view.unmount();
    let drawn = view.with_renderer(|r| r.animals().len());
    info!(
        farm_id = farm_id,
        animals_drawn = drawn,
        positions_applied = stats.positions_applied,
        positions_ignored = stats.positions_ignored,
        alerts = stats.alerts,
        other_events = stats.other_events,
        "herdmap-live stopped"
    );
    Ok(())
}

/// The farm to follow: the explicit flag (or `HERDMAP_FARM_ID`) wins over
/// the session's selected farm.
fn resolve_farm(flag: Option<&str>, session: &Session) -> Result<FarmId, LiveError> {
    flag.map(str::trim).filter(|f| !f.is_empty()).map_or_else(
        || session.farm_id().ok_or(LiveError::NoFarm),
        |raw| {
            raw.parse::<FarmId>().map_err(|source| LiveError::InvalidFarm {
                value: raw.to_owned(),
                source,
            })
        },
    )
}
