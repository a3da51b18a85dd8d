//! Host control-plane interface.
//!
//! The concrete mechanism that creates pools and endpoints on the host is
//! deliberately behind this trait: the supervisor only ever talks to the
//! control plane through [`HostControlPlane`]. The shipped adapters are
//! [`http::HttpHost`] (JSON over HTTP against a management API) and
//! [`sim::SimHost`] (in-memory, used by the test suite).

pub mod http;
pub mod sim;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use http::HttpHost;
pub use sim::SimHost;

/// Idle timeout applied to every pool this tool creates.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 60 * 60);

/// Observed operational state of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointState {
    Stopped,
    Starting,
    Started,
    Stopping,
    /// The host could not report a state (endpoint removed, host error).
    Unknown,
}

impl EndpointState {
    /// States the watchdog treats as live. Anything else triggers teardown.
    pub fn is_live(self) -> bool {
        matches!(self, EndpointState::Starting | EndpointState::Started)
    }
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndpointState::Stopped => "stopped",
            EndpointState::Starting => "starting",
            EndpointState::Started => "started",
            EndpointState::Stopping => "stopping",
            EndpointState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Managed runtime version a pool is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeVersion {
    V2,
    V4,
}

impl FromStr for RuntimeVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "v2.0" | "v2" => Ok(RuntimeVersion::V2),
            "v4.0" | "v4" => Ok(RuntimeVersion::V4),
            other => Err(Error::InvalidRuntime(other.to_string())),
        }
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeVersion::V2 => f.write_str("v2.0"),
            RuntimeVersion::V4 => f.write_str("v4.0"),
        }
    }
}

/// Execution identity class a pool's worker runs under.
///
/// Parsing is case-insensitive and validates before any provisioning
/// begins; an unrecognized identity never reaches the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolIdentity {
    #[default]
    ApplicationPoolIdentity,
    LocalService,
    LocalSystem,
    NetworkService,
}

impl FromStr for PoolIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "applicationpoolidentity" => Ok(PoolIdentity::ApplicationPoolIdentity),
            "localservice" => Ok(PoolIdentity::LocalService),
            "localsystem" => Ok(PoolIdentity::LocalSystem),
            "networkservice" => Ok(PoolIdentity::NetworkService),
            other => Err(Error::InvalidIdentity(other.to_string())),
        }
    }
}

impl fmt::Display for PoolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolIdentity::ApplicationPoolIdentity => "ApplicationPoolIdentity",
            PoolIdentity::LocalService => "LocalService",
            PoolIdentity::LocalSystem => "LocalSystem",
            PoolIdentity::NetworkService => "NetworkService",
        };
        f.write_str(s)
    }
}

/// A runtime pool as created on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub name: String,
    pub runtime: RuntimeVersion,
    pub identity: PoolIdentity,
    pub enable_32bit: bool,
    pub idle_timeout: Duration,
}

impl PoolSpec {
    pub fn new(name: impl Into<String>, runtime: RuntimeVersion, identity: PoolIdentity) -> Self {
        Self {
            name: name.into(),
            runtime,
            identity,
            enable_32bit: true,
            idle_timeout: POOL_IDLE_TIMEOUT,
        }
    }
}

/// A network endpoint as created on the host, bound to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub name: String,
    pub root_path: PathBuf,
    pub port: u16,
    pub auto_start: bool,
    /// Name of the pool the endpoint's default application is assigned to.
    pub pool: String,
}

/// The management operations the supervisor needs from the host.
///
/// Implementations must make `stop` of an already-stopped endpoint a safe
/// no-op: the signal handler, the watchdog, and the linkage watcher may
/// each attempt it without ordering guarantees between them.
#[async_trait]
pub trait HostControlPlane: Send + Sync {
    async fn find_pool(&self, name: &str) -> Result<Option<PoolSpec>>;
    async fn create_pool(&self, spec: &PoolSpec) -> Result<()>;
    async fn remove_pool(&self, name: &str) -> Result<()>;

    async fn find_endpoint(&self, name: &str) -> Result<Option<EndpointSpec>>;
    async fn create_endpoint(&self, spec: &EndpointSpec) -> Result<()>;
    async fn remove_endpoint(&self, name: &str) -> Result<()>;

    /// Applies all pending pool/endpoint changes to the host atomically.
    async fn commit(&self) -> Result<()>;

    async fn start(&self, name: &str) -> Result<()>;

    /// Stops a named endpoint. Fails with [`Error::EndpointNotFound`] when
    /// the host no longer knows the name.
    async fn stop(&self, name: &str) -> Result<()>;

    /// Current operational state of a named endpoint. Reports
    /// [`EndpointState::Unknown`] for a name the host no longer knows.
    async fn state(&self, name: &str) -> Result<EndpointState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_version_parses_known_tags() {
        assert_eq!("v2.0".parse::<RuntimeVersion>().unwrap(), RuntimeVersion::V2);
        assert_eq!("v4.0".parse::<RuntimeVersion>().unwrap(), RuntimeVersion::V4);
        assert_eq!("V4.0".parse::<RuntimeVersion>().unwrap(), RuntimeVersion::V4);
        assert!("v3.5".parse::<RuntimeVersion>().is_err());
        assert!("".parse::<RuntimeVersion>().is_err());
    }

    #[test]
    fn test_identity_parse_is_case_insensitive() {
        assert_eq!(
            "ApplicationPoolIdentity".parse::<PoolIdentity>().unwrap(),
            PoolIdentity::ApplicationPoolIdentity
        );
        assert_eq!(
            "networkservice".parse::<PoolIdentity>().unwrap(),
            PoolIdentity::NetworkService
        );
        assert_eq!(
            "LOCALSYSTEM".parse::<PoolIdentity>().unwrap(),
            PoolIdentity::LocalSystem
        );
    }

    #[test]
    fn test_identity_parse_rejects_unknown_before_provisioning() {
        let err = "SpecialAccount".parse::<PoolIdentity>().unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity(_)));
    }

    #[test]
    fn test_live_set_is_starting_and_started() {
        assert!(EndpointState::Starting.is_live());
        assert!(EndpointState::Started.is_live());
        assert!(!EndpointState::Stopping.is_live());
        assert!(!EndpointState::Stopped.is_live());
        assert!(!EndpointState::Unknown.is_live());
    }

    #[test]
    fn test_pool_spec_defaults() {
        let pool = PoolSpec::new("site1", RuntimeVersion::V4, PoolIdentity::default());
        assert!(pool.enable_32bit);
        assert_eq!(pool.idle_timeout, Duration::from_secs(7 * 60 * 60));
    }
}
