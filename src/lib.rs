//! # Endpoint Warden
//!
//! Provisions a named, port-bound endpoint on a host control plane and
//! supervises it for the lifetime of a controlling process.
//!
//! ## Features
//!
//! - **Idempotent provisioning**: replace-not-merge creation of a runtime
//!   pool and an endpoint bound to it
//! - **Warmup**: optional one-shot HTTP readiness probe after start
//! - **Watchdog**: level-triggered state poll that tears the endpoint down
//!   the moment it leaves the live set
//! - **Signal handling**: best-effort stop on catchable termination signals
//! - **Linkage watcher**: a detached sibling process that stops the
//!   endpoint when an arbitrary watched process dies, surviving the
//!   supervisor's own ungraceful death
//!
//! ## Quick Start
//!
//! ```no_run
//! use endpoint_warden::{
//!     HostControlPlane, PoolIdentity, ProvisionRequest, Provisioner, RuntimeVersion,
//!     SupervisionSession,
//! };
//! use endpoint_warden::host::HttpHost;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), endpoint_warden::Error> {
//! let host: Arc<dyn HostControlPlane> = Arc::new(HttpHost::new("http://localhost:7071")?);
//!
//! let request = ProvisionRequest {
//!     name: "site1".to_string(),
//!     runtime: RuntimeVersion::V4,
//!     identity: PoolIdentity::default(),
//!     root_path: "/var/www/site1".into(),
//!     port: 8080,
//! };
//! Provisioner::new(host.clone()).provision(&request).await?;
//!
//! let session = SupervisionSession::new(host, "site1");
//! let departed =
//!     endpoint_warden::watchdog::watch(&session, endpoint_warden::watchdog::POLL_INTERVAL).await?;
//! println!("endpoint left the live set: {}", departed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! One OS process per supervised endpoint, plus one detached watcher
//! process per linkage request. Within the main process the watchdog, the
//! warmup probe, and the signal handler share a single
//! [`SupervisionSession`]; `stop` is idempotent, so no caller ordering is
//! required.

pub mod error;
pub mod host;
pub mod linkage;
pub mod provision;
pub mod session;
pub mod signals;
pub mod warmup;
pub mod watchdog;

// Re-export commonly used types
pub use error::{Error, Result};
pub use host::{EndpointState, HostControlPlane, PoolIdentity, RuntimeVersion};
pub use provision::{ProvisionRequest, Provisioner};
pub use session::SupervisionSession;
pub use warmup::{warmup, WarmupOutcome};
