//! Dashboard configuration.
//!
//! The configuration lives in `herdmap-config.yaml`. Every section and
//! every field has a default, so a missing file or an empty one yields a
//! working local setup. Three environment variables override the file:
//!
//! | Variable               | Field               |
//! |------------------------|---------------------|
//! | `HERDMAP_API_URL`      | `api.base_url`      |
//! | `HERDMAP_WS_URL`       | `stream.url`        |
//! | `HERDMAP_SESSION_PATH` | `session.path`      |

use std::path::{Path, PathBuf};

use herdmap_map::MapConfig;
use herdmap_stream::StreamConfig;
use serde::Deserialize;
use tracing::info;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardConfig {
    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Live stream settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Map renderer settings.
    #[serde(default)]
    pub map: MapConfig,

    /// Session persistence settings.
    #[serde(default)]
    pub session: SessionConfig,
}

impl DashboardConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        info!(path = %path.display(), "config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document is YAML null, not an empty mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HERDMAP_API_URL") {
            self.api.base_url = val;
        }
        if let Some(val) = lookup("HERDMAP_WS_URL") {
            self.stream.url = val;
        }
        if let Some(val) = lookup("HERDMAP_SESSION_PATH") {
            self.session.path = PathBuf::from(val);
        }
    }
}

/// REST API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Session persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// JSON file holding the login session.
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_api_url() -> String {
    String::from("http://localhost:8080/api/v1")
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_session_path() -> PathBuf {
    PathBuf::from("herdmap-session.json")
}
