//! HTTP adapter for the host control plane.
//!
//! Talks JSON to a management API rooted at a base URL. The route layout is
//! flat: `pools/{name}` and `endpoints/{name}` for configuration records,
//! `endpoints/{name}/start|stop|state` for lifecycle, and `commit` to apply
//! pending changes.

use super::{EndpointSpec, EndpointState, HostControlPlane, PoolSpec};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Process-wide shared HTTP client.
///
/// One client serves the control-plane adapter and the warmup probe; its
/// connection pool is reused across requests. Individual requests override
/// the fallback timeout with their own.
static SHARED_HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

pub(crate) fn shared_client() -> &'static Client {
    SHARED_HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create shared HTTP client")
    })
}

#[derive(Deserialize)]
struct StateBody {
    state: EndpointState,
}

/// Control-plane client bound to one base URL.
pub struct HttpHost {
    base: Url,
    client: Client,
}

impl HttpHost {
    /// Creates a client for the control plane at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or uses a scheme other
    /// than http/https.
    pub fn new(base: &str) -> Result<Self> {
        let url = Url::parse(base)
            .map_err(|e| Error::HostApi(format!("Invalid host API URL '{}': {}", base, e)))?;
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::HostApi(format!(
                "Invalid host API URL '{}': scheme must be http or https, got '{}'",
                base, scheme
            )));
        }
        Ok(Self {
            base: url,
            client: shared_client().clone(),
        })
    }

    fn route(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::HostApi(format!("Invalid route '{}': {}", path, e)))
    }

    async fn expect_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(Error::HostApi(format!(
            "{}: host answered {}{}",
            context,
            status,
            if body.is_empty() {
                String::new()
            } else {
                format!(" ({})", body.trim())
            }
        )))
    }
}

#[async_trait]
impl HostControlPlane for HttpHost {
    async fn find_pool(&self, name: &str) -> Result<Option<PoolSpec>> {
        let resp = self
            .client
            .get(self.route(&format!("pools/{}", name))?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::expect_success(resp, "find pool").await?;
        Ok(Some(resp.json().await?))
    }

    async fn create_pool(&self, spec: &PoolSpec) -> Result<()> {
        let resp = self
            .client
            .put(self.route(&format!("pools/{}", spec.name))?)
            .json(spec)
            .send()
            .await?;
        Self::expect_success(resp, "create pool").await?;
        Ok(())
    }

    async fn remove_pool(&self, name: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.route(&format!("pools/{}", name))?)
            .send()
            .await?;
        // Removing an absent pool is not a failure.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::expect_success(resp, "remove pool").await?;
        Ok(())
    }

    async fn find_endpoint(&self, name: &str) -> Result<Option<EndpointSpec>> {
        let resp = self
            .client
            .get(self.route(&format!("endpoints/{}", name))?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::expect_success(resp, "find endpoint").await?;
        Ok(Some(resp.json().await?))
    }

    async fn create_endpoint(&self, spec: &EndpointSpec) -> Result<()> {
        let resp = self
            .client
            .put(self.route(&format!("endpoints/{}", spec.name))?)
            .json(spec)
            .send()
            .await?;
        Self::expect_success(resp, "create endpoint").await?;
        Ok(())
    }

    async fn remove_endpoint(&self, name: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.route(&format!("endpoints/{}", name))?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::expect_success(resp, "remove endpoint").await?;
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let resp = self.client.post(self.route("commit")?).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::HostCommit(format!(
                "host answered {}{}",
                status,
                if body.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", body.trim())
                }
            )));
        }
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.route(&format!("endpoints/{}/start", name))?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::EndpointNotFound(name.to_string()));
        }
        Self::expect_success(resp, "start endpoint").await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.route(&format!("endpoints/{}/stop", name))?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::EndpointNotFound(name.to_string()));
        }
        Self::expect_success(resp, "stop endpoint").await?;
        Ok(())
    }

    async fn state(&self, name: &str) -> Result<EndpointState> {
        let resp = self
            .client
            .get(self.route(&format!("endpoints/{}/state", name))?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(EndpointState::Unknown);
        }
        let resp = Self::expect_success(resp, "endpoint state").await?;
        let body: StateBody = resp.json().await?;
        Ok(body.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpHost::new("not-a-url").is_err());
        assert!(HttpHost::new("ftp://localhost:7071").is_err());
        assert!(HttpHost::new("http://localhost:7071").is_ok());
        assert!(HttpHost::new("https://hosting.internal/api/").is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_surfaces_transport_error() {
        // Valid but unlikely-to-be-used port.
        let host = HttpHost::new("http://localhost:59993").unwrap();
        let result = host.find_endpoint("site1").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
