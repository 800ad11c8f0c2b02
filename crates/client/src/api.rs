//! REST client for the run coordinator's HTTP endpoints.
//!
//! Wraps the coordinator protocol (status reads and writes, quants merge,
//! run prerequisites) using [`reqwest`]. Every call goes through
//! [`with_retry`](crate::retry::with_retry).

use std::time::Duration;

use m4db_core::magnetization::InitialMagnetization;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::types::UniqueId;
use m4db_core::wire::{Envelope, RunPrerequisites, SetRunningStatusRequest, UNIQUE_ID_KEY};
use serde::de::DeserializeOwned;

use crate::retry::{is_retryable_status, with_retry, RetryPolicy};

/// Errors from the coordinator client.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The coordinator does not know the requested id.
    #[error("Not found: {id}")]
    NotFound { id: String },

    /// A conditional write found a different current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The coordinator returned any other non-2xx status code.
    #[error("Coordinator API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A retryable failure persisted through every retry.
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    Transient {
        operation: &'static str,
        attempts: u32,
        last_error: String,
    },
}

impl CoordinatorError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => is_retryable_status(*status),
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::NotFound { .. } | Self::Conflict(_) | Self::Transient { .. } => false,
        }
    }
}

/// HTTP client for a single coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CoordinatorClient {
    /// Create a client with a per-request timeout.
    ///
    /// * `base_url` - e.g. `http://coordinator:8080`; a trailing slash is ignored.
    pub fn new(
        base_url: &str,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, CoordinatorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, retry))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /is-alive`. Any failure reads as "not alive".
    pub async fn is_alive(&self) -> bool {
        let url = format!("{}/is-alive", self.base_url);
        match self.get_json::<bool>(&url, "coordinator").await {
            Ok(alive) => alive,
            Err(e) => {
                tracing::debug!(error = %e, "Coordinator liveness probe failed");
                false
            }
        }
    }

    /// `GET /model/{id}/running-status`.
    pub async fn get_running_status(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunningStatus, CoordinatorError> {
        let url = format!("{}/model/{unique_id}/running-status", self.base_url);
        let id = unique_id.to_string();
        with_retry(&self.retry, "get_running_status", || {
            self.get_json(&url, &id)
        })
        .await
    }

    /// `GET /model/{id}/initial-magnetization`.
    pub async fn get_initial_magnetization(
        &self,
        unique_id: &UniqueId,
    ) -> Result<InitialMagnetization, CoordinatorError> {
        let url = format!("{}/model/{unique_id}/initial-magnetization", self.base_url);
        let id = unique_id.to_string();
        with_retry(&self.retry, "get_initial_magnetization", || {
            self.get_json(&url, &id)
        })
        .await
    }

    /// `GET /model/{id}/run-prerequisites`.
    pub async fn get_run_prerequisites(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunPrerequisites, CoordinatorError> {
        let url = format!("{}/model/{unique_id}/run-prerequisites", self.base_url);
        let id = unique_id.to_string();
        with_retry(&self.retry, "get_run_prerequisites", || {
            self.get_json(&url, &id)
        })
        .await
    }

    /// `POST /model/set-running-status`, unconditionally.
    pub async fn set_running_status(
        &self,
        unique_id: &UniqueId,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError> {
        self.post_running_status(unique_id, new_status, None).await
    }

    /// `POST /model/set-running-status` guarded by the expected current status.
    pub async fn set_running_status_if(
        &self,
        unique_id: &UniqueId,
        expected: RunningStatus,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError> {
        self.post_running_status(unique_id, new_status, Some(expected))
            .await
    }

    /// `POST /model/set-quants`. Returns the merged quants.
    pub async fn set_quants(
        &self,
        unique_id: &UniqueId,
        quants: &ModelQuants,
    ) -> Result<ModelQuants, CoordinatorError> {
        let mut body = match serde_json::to_value(quants) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        body.insert(
            UNIQUE_ID_KEY.to_string(),
            serde_json::Value::String(unique_id.to_string()),
        );
        let body = serde_json::Value::Object(body);
        let url = format!("{}/model/set-quants", self.base_url);
        let id = unique_id.to_string();

        with_retry(&self.retry, "set_quants", || {
            self.post_json(&url, &body, &id)
        })
        .await
    }

    // ---- private helpers ----

    async fn post_running_status(
        &self,
        unique_id: &UniqueId,
        new_status: RunningStatus,
        expected: Option<RunningStatus>,
    ) -> Result<RunningStatus, CoordinatorError> {
        let body = SetRunningStatusRequest {
            unique_id: *unique_id,
            new_running_status: new_status,
            expected_running_status: expected,
        };
        let url = format!("{}/model/set-running-status", self.base_url);
        let id = unique_id.to_string();

        let status = with_retry(&self.retry, "set_running_status", || {
            self.post_json(&url, &body, &id)
        })
        .await?;
        tracing::debug!(unique_id = %unique_id, status = %status, "Running status set");
        Ok(status)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        id: &str,
    ) -> Result<T, CoordinatorError> {
        let response = self.client.get(url).send().await?;
        Self::parse_response(response, id).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        id: &str,
    ) -> Result<T, CoordinatorError> {
        let response = self.client.post(url).json(body).send().await?;
        Self::parse_response(response, id).await
    }

    /// Ensure the response has a success status code, mapping 404 and 409
    /// onto their own variants.
    async fn ensure_success(
        response: reqwest::Response,
        id: &str,
    ) -> Result<reqwest::Response, CoordinatorError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(match status.as_u16() {
            404 => CoordinatorError::NotFound { id: id.to_string() },
            409 => CoordinatorError::Conflict(body),
            status => CoordinatorError::Api { status, body },
        })
    }

    /// Parse a successful `{"return": ...}` body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        id: &str,
    ) -> Result<T, CoordinatorError> {
        let response = Self::ensure_success(response, id).await?;
        Ok(response.json::<Envelope<T>>().await?.value)
    }
}
