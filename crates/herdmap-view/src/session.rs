//! Persisted login session.
//!
//! The session is whatever the login flow left behind: the signed-in user,
//! the farm they picked, and the bearer tokens. It is stored as one JSON
//! file. A missing file is an empty (signed-out) session, not an error.

use std::path::{Path, PathBuf};

use herdmap_types::{Farm, FarmId, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Errors from reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session file could not be read or written.
    #[error("session file {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The session file is not valid session JSON.
    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        /// File involved.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// The session could not be encoded.
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The signed-in user's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in user.
    #[serde(default)]
    pub user: Option<User>,
    /// Farm currently selected.
    #[serde(default)]
    pub farm: Option<Farm>,
    /// Bearer token for API calls.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token used to obtain a new access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Session {
    /// Whether the session carries an access token.
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// The selected farm's id, which is the map's context id.
    pub fn farm_id(&self) -> Option<FarmId> {
        self.farm.as_ref().map(|f| f.id)
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by `path`. Nothing is touched until used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session. A missing file loads as an empty session.
    pub fn load(&self) -> Result<Session, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session file");
                return Ok(Session::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&contents).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the session, creating parent directories as needed.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(session)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        std::fs::write(&self.path, json).map_err(|source| self.io_error(source))?;
        info!(
            path = %self.path.display(),
            authenticated = session.is_authenticated(),
            "session saved"
        );
        Ok(())
    }

    /// Sign out: remove the session file. Removing a missing file is fine.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
