//! Service Wire Payloads
//!
//! Request/response bodies for the persistence and prediction endpoints.
//! Field names are the backend's contract, so they stay as-is on the wire.

use serde::{Serialize, Deserialize};

/// Metrics captured when a session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Final score.
    pub score: u32,
    /// Whole seconds the session lasted.
    pub elapsed_seconds: u64,
    /// Lives remaining (zero at game over, by invariant).
    pub lives: u32,
    /// Level at the time the session ended.
    pub level: u32,
}

/// Body of `POST /guardar_datos`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Score.
    pub puntaje: u32,
    /// Elapsed seconds.
    pub tiempo: u64,
    /// Lives remaining.
    pub vidas: u32,
    /// Level.
    pub nivel: u32,
}

impl From<SessionMetrics> for SaveRequest {
    fn from(m: SessionMetrics) -> Self {
        Self {
            puntaje: m.score,
            tiempo: m.elapsed_seconds,
            vidas: m.lives,
            nivel: m.level,
        }
    }
}

/// Body of `POST /predecir`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Score.
    pub puntaje: u32,
    /// Elapsed seconds.
    pub tiempo: u64,
    /// Lives remaining.
    pub vidas: u32,
}

impl From<SessionMetrics> for PredictRequest {
    fn from(m: SessionMetrics) -> Self {
        Self {
            puntaje: m.score,
            tiempo: m.elapsed_seconds,
            vidas: m.lives,
        }
    }
}

/// Response of `POST /predecir`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Suggested level for the next session.
    pub nivel_predicho: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> SessionMetrics {
        SessionMetrics {
            score: 7,
            elapsed_seconds: 42,
            lives: 0,
            level: 2,
        }
    }

    #[test]
    fn test_save_request_wire_shape() {
        let body = serde_json::to_value(SaveRequest::from(metrics())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"puntaje": 7, "tiempo": 42, "vidas": 0, "nivel": 2})
        );
    }

    #[test]
    fn test_predict_request_omits_level() {
        let body = serde_json::to_value(PredictRequest::from(metrics())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"puntaje": 7, "tiempo": 42, "vidas": 0})
        );
    }

    #[test]
    fn test_predict_response_parse() {
        let response: PredictResponse =
            serde_json::from_str("{\"nivel_predicho\": 3}").unwrap();
        assert_eq!(response.nivel_predicho, 3);

        // Wrong shape must fail, not default
        assert!(serde_json::from_str::<PredictResponse>("{\"nivel\": 3}").is_err());
    }
}
