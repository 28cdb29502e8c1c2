//! Round-End Services
//!
//! HTTP collaborators consulted once per finished session: the level
//! predictor (Adaptive mode) and the persistence store (Manual mode).
//! Fire-and-forget relative to game state - the session is already `Over`
//! before either is called, and only the predictor's success feeds back
//! (via the app loop) into palette and level.

pub mod protocol;
pub mod predictor;
pub mod reporter;

pub use protocol::{SessionMetrics, PredictResponse};
pub use predictor::PredictorClient;
pub use reporter::ReporterClient;

use std::time::Duration;

/// Bound on each external call; timeout is a reportable failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Service call errors. All non-fatal: they become notices, never crashes.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned status {0}")]
    Status(u16),

    /// The endpoint answered 200 with an unexpected body shape.
    #[error("Malformed response body")]
    BadResponse,
}

/// Shared client constructor with the standard timeout.
pub(crate) fn build_client() -> Result<reqwest::Client, ServiceError> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

// =============================================================================
// TEST FIXTURE
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP request with a canned JSON response.
    ///
    /// Reads the full request (headers plus `Content-Length` body) before
    /// answering, so clients never see a truncated exchange.
    pub(crate) async fn one_shot_http(
        body: &str,
        status: u16,
    ) -> (SocketAddr, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Drain the request: headers, then the declared body length
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            let body_start;
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before request completed");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_header_end(&request) {
                    body_start = pos;
                    break;
                }
            }
            let content_length = parse_content_length(&request[..body_start]);
            while request.len() < body_start + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed mid-body");
                request.extend_from_slice(&chunk[..n]);
            }

            let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (addr, handle)
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|pos| pos + 4)
    }

    fn parse_content_length(headers: &[u8]) -> usize {
        let text = String::from_utf8_lossy(headers);
        text.lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0)
    }
}
