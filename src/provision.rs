//! Endpoint provisioning.
//!
//! Provisioning replaces, never merges: any pool or endpoint already
//! registered under the requested name is removed before the new pair is
//! created. A crash between steps can leave an orphaned pool with no
//! endpoint; the next provisioning call for the same name cleans it up.

use crate::error::{Error, Result};
use crate::host::{EndpointSpec, HostControlPlane, PoolIdentity, PoolSpec, RuntimeVersion};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Pause after commit before issuing start, giving the host control plane
/// time to apply the committed configuration.
pub const COMMIT_SETTLE: Duration = Duration::from_millis(500);

/// Everything needed to provision one endpoint.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub name: String,
    pub runtime: RuntimeVersion,
    pub identity: PoolIdentity,
    pub root_path: PathBuf,
    pub port: u16,
}

/// Creates (replacing any same-named prior instance) a pool and an endpoint
/// bound to it, commits, and issues start.
pub struct Provisioner {
    host: Arc<dyn HostControlPlane>,
    settle: Duration,
}

impl Provisioner {
    pub fn new(host: Arc<dyn HostControlPlane>) -> Self {
        Self {
            host,
            settle: COMMIT_SETTLE,
        }
    }

    /// Overrides the post-commit settle delay. Tests use a zero delay.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Runs the full provisioning sequence for `request`.
    ///
    /// Any step may fail; there is no rollback. The caller retries by
    /// invoking provisioning again with the same name. Commit failures keep
    /// their own error shape; every other step failure surfaces as
    /// [`Error::Provision`].
    #[tracing::instrument(skip(self, request), fields(endpoint.name = %request.name))]
    pub async fn provision(&self, request: &ProvisionRequest) -> Result<()> {
        let name = &request.name;
        let step_failed = |e: Error| Error::Provision(e.to_string());

        if self.host.find_pool(name).await.map_err(step_failed)?.is_some() {
            tracing::debug!("Removing existing pool '{}'", name);
            self.host.remove_pool(name).await.map_err(step_failed)?;
        }

        tracing::debug!(
            "Creating pool '{}' (runtime {}, identity {})",
            name,
            request.runtime,
            request.identity
        );
        let pool = PoolSpec::new(name.clone(), request.runtime, request.identity);
        self.host.create_pool(&pool).await.map_err(step_failed)?;

        if self
            .host
            .find_endpoint(name)
            .await
            .map_err(step_failed)?
            .is_some()
        {
            tracing::debug!("Removing existing endpoint '{}'", name);
            self.host.remove_endpoint(name).await.map_err(step_failed)?;
        }

        tracing::debug!(
            "Creating endpoint '{}' (root {}, port {})",
            name,
            request.root_path.display(),
            request.port
        );
        let endpoint = EndpointSpec {
            name: name.clone(),
            root_path: request.root_path.clone(),
            port: request.port,
            auto_start: true,
            pool: name.clone(),
        };
        self.host
            .create_endpoint(&endpoint)
            .await
            .map_err(step_failed)?;

        self.host.commit().await?;
        tokio::time::sleep(self.settle).await;

        tracing::debug!("Starting endpoint '{}'", name);
        self.host.start(name).await.map_err(step_failed)?;

        Ok(())
    }
}
