//! Session Reporter Client
//!
//! Manual-mode round end: ships session metrics to the persistence
//! endpoint. Success or failure only ever becomes a notice; game state is
//! untouched either way.

use tracing::{info, instrument};

use crate::service::{ServiceError, build_client};
use crate::service::protocol::{SaveRequest, SessionMetrics};

/// Client for `POST /guardar_datos`.
pub struct ReporterClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReporterClient {
    /// Create a client against `base_url` with the standard timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
        })
    }

    /// Persist the finished session's metrics.
    #[instrument(skip(self))]
    pub async fn save(&self, metrics: SessionMetrics) -> Result<(), ServiceError> {
        let url = format!("{}/guardar_datos", self.base_url);
        let body = SaveRequest::from(metrics);

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        info!(score = metrics.score, "session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::one_shot_http;

    fn metrics() -> SessionMetrics {
        SessionMetrics {
            score: 4,
            elapsed_seconds: 33,
            lives: 0,
            level: 1,
        }
    }

    #[tokio::test]
    async fn test_save_succeeds_on_ok() {
        let (addr, server) = one_shot_http("{\"ok\": true}", 200).await;
        let client = ReporterClient::new(format!("http://{}", addr)).unwrap();
        assert!(client.save(metrics()).await.is_ok());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_save_surfaces_error_status() {
        let (addr, server) = one_shot_http("nope", 503).await;
        let client = ReporterClient::new(format!("http://{}", addr)).unwrap();
        let result = client.save(metrics()).await;
        assert!(matches!(result, Err(ServiceError::Status(503))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_save_network_failure_is_http_error() {
        let client = ReporterClient::new("http://127.0.0.1:1").unwrap();
        let result = client.save(metrics()).await;
        assert!(matches!(result, Err(ServiceError::Http(_))));
    }
}
