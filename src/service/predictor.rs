//! Difficulty Predictor Client
//!
//! Adaptive-mode round end: ships session metrics to the level predictor
//! and returns the suggested level. One attempt per round, bounded by the
//! client timeout; any failure is reported, never retried.

use tracing::{info, instrument};

use crate::service::{ServiceError, build_client};
use crate::service::protocol::{PredictRequest, PredictResponse, SessionMetrics};

/// Client for `POST /predecir`.
pub struct PredictorClient {
    client: reqwest::Client,
    base_url: String,
}

impl PredictorClient {
    /// Create a client against `base_url` with the standard timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
        })
    }

    /// Request a suggested level for the finished session.
    #[instrument(skip(self))]
    pub async fn predict(&self, metrics: SessionMetrics) -> Result<u32, ServiceError> {
        let url = format!("{}/predecir", self.base_url);
        let body = PredictRequest::from(metrics);

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|_| ServiceError::BadResponse)?;

        info!(suggested = parsed.nivel_predicho, "predictor replied");
        Ok(parsed.nivel_predicho)
    }
}
