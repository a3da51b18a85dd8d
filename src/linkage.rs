//! Cross-process linkage supervision.
//!
//! The watcher is a second, detached process running this same binary in
//! `--watch` mode. It polls a bare process id for liveness and stops the
//! endpoint the moment that process is gone. No pipe or socket ties it to
//! its spawner: a PID existence check stays valid after the spawner is
//! killed ungracefully, which is exactly the failure mode this covers.

use crate::error::Result;
use crate::host::HostControlPlane;
use crate::session::SupervisionSession;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::time::MissedTickBehavior;

/// Fixed interval between liveness polls.
pub const LIVENESS_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Process-existence primitive the watcher polls.
pub trait ProcessProbe: Send + Sync {
    fn exists(&self, pid: u32) -> bool;
}

/// Probe backed by the host's signal-0 check.
///
/// A PID reused by an unrelated process after the watched one exits will
/// still report as existing; the short poll interval keeps that window
/// small relative to typical PID-reuse latency.
pub struct HostProcessProbe;

impl ProcessProbe for HostProcessProbe {
    fn exists(&self, pid: u32) -> bool {
        match crate::error::validate_pid_for_check(pid) {
            Some(pid) => nix::sys::signal::kill(pid, None).is_ok(),
            None => false,
        }
    }
}

/// Spawns the detached watcher process for `watched_pid`.
///
/// The watcher's stdout is relayed line-buffered to this process's stdout
/// for observability, but the child is never waited on: it outlives the
/// spawner by design. The returned handle is informational only.
pub fn spawn_watcher(
    watched_pid: u32,
    endpoint: &str,
    host_api: &str,
    debug: bool,
) -> Result<Child> {
    let exe = std::env::current_exe()?;
    let mut cmd = tokio::process::Command::new(exe);
    cmd.arg("--watch")
        .arg(watched_pid.to_string())
        .arg("--name")
        .arg(endpoint)
        .arg("--host-api")
        .arg(host_api);
    if debug {
        cmd.arg("--debug");
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        // The watcher must keep running after this handle is dropped.
        .kill_on_drop(false);

    let mut child = cmd.spawn()?;

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                println!("{}", line);
            }
        });
    }

    tracing::debug!(
        "Spawned linkage watcher for process {} (watcher pid {:?})",
        watched_pid,
        child.id()
    );

    Ok(child)
}

/// Watcher-side loop: polls `watched_pid` every `interval` and, the moment
/// it no longer exists, stops the endpoint identified by `endpoint`.
///
/// The endpoint is looked up fresh by name; this process holds no live
/// reference. A name the host no longer knows is treated as already
/// stopped.
pub async fn run_watcher(
    host: Arc<dyn HostControlPlane>,
    probe: &dyn ProcessProbe,
    watched_pid: u32,
    endpoint: &str,
    interval: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if probe.exists(watched_pid) {
            tracing::trace!("Process {} still exists", watched_pid);
            continue;
        }

        tracing::info!(
            "Watched process {} is gone, stopping endpoint '{}'",
            watched_pid,
            endpoint
        );

        if host.find_endpoint(endpoint).await?.is_none() {
            tracing::info!("Endpoint '{}' no longer exists, nothing to stop", endpoint);
            return Ok(());
        }

        // The session treats a name removed between lookup and stop as
        // already satisfied.
        let session = SupervisionSession::new(host, endpoint);
        return session.stop().await;
    }
}
