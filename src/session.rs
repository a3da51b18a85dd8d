//! The supervision session: the one endpoint this process is responsible
//! for, shared read-only with the signal handler and the watchdog loop.

use crate::error::{Error, Result};
use crate::host::{EndpointState, HostControlPlane};
use std::sync::Arc;

/// In-process record of the endpoint owned by this invocation.
///
/// Cloning is cheap and shares the underlying host handle; every clone
/// refers to the same endpoint. `stop()` is idempotent and safe to invoke
/// from multiple callers without ordering guarantees between them.
#[derive(Clone)]
pub struct SupervisionSession {
    host: Arc<dyn HostControlPlane>,
    endpoint: String,
}

impl SupervisionSession {
    pub fn new(host: Arc<dyn HostControlPlane>, endpoint: impl Into<String>) -> Self {
        Self {
            host,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current observed state; host errors report as Unknown.
    pub async fn state(&self) -> EndpointState {
        match self.host.state(&self.endpoint).await {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(
                    "Failed to read state of endpoint '{}': {}",
                    self.endpoint,
                    e
                );
                EndpointState::Unknown
            }
        }
    }

    /// Stops the endpoint. Idempotent: an endpoint already observed as
    /// stopped is left alone, and an endpoint the host no longer knows is
    /// treated as already satisfied.
    pub async fn stop(&self) -> Result<()> {
        if self.state().await == EndpointState::Stopped {
            tracing::debug!("Endpoint '{}' is already stopped", self.endpoint);
            return Ok(());
        }
        match self.host.stop(&self.endpoint).await {
            Ok(()) => {
                tracing::info!("Endpoint '{}' stopped", self.endpoint);
                Ok(())
            }
            Err(Error::EndpointNotFound(_)) => {
                tracing::debug!(
                    "Endpoint '{}' no longer exists, nothing to stop",
                    self.endpoint
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
