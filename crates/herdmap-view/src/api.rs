//! REST client for the farm API.
//!
//! Every endpoint answers with the `{ data, error, message }` envelope.
//! A success with no `data` is an empty list. A non-success status is
//! reported with the envelope's `error` text when the body has one.
//! Requests carry the session's access token as a bearer token; token
//! refresh is left to the login flow.

use std::time::Duration;

use herdmap_types::{Animal, ApiResponse, KeyPoint, Zone};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::snapshot::SnapshotSource;

/// Errors from the REST client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete (connect, timeout, body read).
    #[error("request to {path} failed: {source}")]
    Request {
        /// Endpoint path.
        path: String,
        /// The underlying HTTP error.
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{path} returned {status}: {message}")]
    Status {
        /// Endpoint path.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Error text from the envelope, or the status reason.
        message: String,
    },

    /// The body was not the expected envelope.
    #[error("unexpected response body from {path}: {source}")]
    Decode {
        /// Endpoint path.
        path: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}

/// Farm API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a client for `config.base_url`, authenticating with
    /// `access_token` when one is given.
    pub fn new(config: &ApiConfig, access_token: Option<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            access_token,
        })
    }

    /// `GET /animals`.
    pub async fn list_animals(&self) -> Result<Vec<Animal>, ApiError> {
        self.get_list("/animals").await
    }

    /// `GET /zones`.
    pub async fn list_zones(&self) -> Result<Vec<Zone>, ApiError> {
        self.get_list("/zones").await
    }

    /// `GET /zones/keypoints`.
    pub async fn list_key_points(&self) -> Result<Vec<KeyPoint>, ApiError> {
        self.get_list("/zones/keypoints").await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let request_error = |source| ApiError::Request {
            path: path.to_owned(),
            source,
        };

        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(request_error)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
            warn!(
                path = path,
                status = status.as_u16(),
                message = %message,
                "API request rejected"
            );
            return Err(ApiError::Status {
                path: path.to_owned(),
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse<Vec<T>> =
            serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
                path: path.to_owned(),
                source,
            })?;
        let items = envelope.data.unwrap_or_default();
        debug!(path = path, count = items.len(), "API list fetched");
        Ok(items)
    }
}

impl SnapshotSource for ApiClient {
    type Error = ApiError;

    async fn list_animals(&self) -> Result<Vec<Animal>, ApiError> {
        Self::list_animals(self).await
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, ApiError> {
        Self::list_zones(self).await
    }

    async fn list_key_points(&self) -> Result<Vec<KeyPoint>, ApiError> {
        Self::list_key_points(self).await
    }
}
