//! One-shot readiness probe issued against a freshly started endpoint.

use crate::host::http::shared_client;
use reqwest::StatusCode;
use std::time::Duration;

/// Default bound on the warmup request.
pub const DEFAULT_WARMUP_TIMEOUT: Duration = Duration::from_secs(180);

/// Result of a warmup request. Only HTTP 200 counts as ready; any other
/// status or a transport/timeout error is a failure, with no retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmupOutcome {
    Ready,
    Failed {
        /// HTTP status when the endpoint answered; None on transport errors.
        status: Option<u16>,
        detail: String,
    },
}

impl WarmupOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WarmupOutcome::Ready)
    }
}

/// Issues one GET against `http://localhost:{port}{path}` with the given
/// timeout. The response body is drained to debug output for diagnostics
/// but never interpreted.
pub async fn warmup(port: u16, path: &str, timeout: Duration) -> WarmupOutcome {
    let url = format!("http://localhost:{}{}", port, path);
    tracing::debug!("Performing warmup at {}", url);

    let response = match shared_client().get(&url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            return WarmupOutcome::Failed {
                status: None,
                detail: e.to_string(),
            };
        }
    };

    let status = response.status();
    if status == StatusCode::OK {
        tracing::debug!("Warmup ok");
        return WarmupOutcome::Ready;
    }

    match response.text().await {
        Ok(body) => {
            for line in body.lines() {
                tracing::debug!("warmup response: {}", line);
            }
        }
        Err(e) => {
            tracing::debug!("Failed to drain warmup response body: {}", e);
        }
    }

    WarmupOutcome::Failed {
        status: Some(status.as_u16()),
        detail: format!("received status {} during warmup", status),
    }
}
