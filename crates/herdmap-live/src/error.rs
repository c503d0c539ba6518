//! Error types for the `herdmap-live` binary.

/// Top-level error for the runner.
///
/// Each variant wraps one subsystem's error so `run` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: herdmap_view::ConfigError,
    },

    /// The session file could not be read.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: herdmap_view::SessionError,
    },

    /// The REST client could not be created.
    #[error("API client error: {source}")]
    Api {
        /// The underlying API error.
        #[from]
        source: herdmap_view::ApiError,
    },

    /// Mounting the map view failed.
    #[error("view error: {source}")]
    View {
        /// The underlying view error.
        #[from]
        source: herdmap_view::ViewError,
    },

    /// No farm was selected in the session, on the command line, or in the
    /// environment.
    #[error("no farm selected: sign in and pick a farm, or pass --farm / set HERDMAP_FARM_ID")]
    NoFarm,

    /// The farm given on the command line or in the environment is not a
    /// valid farm id.
    #[error("invalid farm id {value:?}: {source}")]
    InvalidFarm {
        /// The value as given.
        value: String,
        /// The underlying parse error.
        source: uuid::Error,
    },

    /// Waiting for the shutdown signal failed.
    #[error("failed to listen for Ctrl-C: {0}")]
    Signal(#[source] std::io::Error),
}
