//! Termination-notification handling.
//!
//! Registers for the catchable termination signals and issues a
//! best-effort stop on the active session before the process exits. This
//! cannot run after SIGKILL; the linkage watcher exists to close exactly
//! that gap.

use crate::session::SupervisionSession;
use std::sync::Arc;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::RwLock;

/// Slot the signal handler reads the active session from.
///
/// The handler is registered before the endpoint is created, so the slot
/// starts empty; a signal arriving before provisioning completes is a
/// no-op rather than a fault.
pub type SessionSlot = Arc<RwLock<Option<SupervisionSession>>>;

pub fn new_slot() -> SessionSlot {
    Arc::new(RwLock::new(None))
}

async fn recv_or_pending(stream: &mut Option<Signal>) -> Option<()> {
    match stream {
        Some(s) => s.recv().await,
        None => std::future::pending().await,
    }
}

/// Registers handlers for SIGINT, SIGTERM, and SIGHUP. On the first signal
/// received, stops the session in `slot` (if one is set) and exits 0.
pub fn register_shutdown_handler(slot: SessionSlot) {
    tokio::spawn(async move {
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!("Failed to create SIGINT handler: {}", e);
                None
            }
        };
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!("Failed to create SIGTERM handler: {}", e);
                None
            }
        };
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!("Failed to create SIGHUP handler: {}", e);
                None
            }
        };

        if sigint.is_none() && sigterm.is_none() && sighup.is_none() {
            tracing::warn!(
                "No signal handlers available - endpoint teardown relies on the linkage watcher"
            );
            return;
        }

        tokio::select! {
            _ = recv_or_pending(&mut sigint) => {}
            _ = recv_or_pending(&mut sigterm) => {}
            _ = recv_or_pending(&mut sighup) => {}
        }

        let guard = slot.read().await;
        match guard.as_ref() {
            Some(session) => {
                tracing::info!(
                    "Termination signal received, stopping endpoint '{}'",
                    session.endpoint()
                );
                if let Err(e) = session.stop().await {
                    // Best effort: the process is exiting regardless.
                    tracing::warn!("Failed to stop endpoint on shutdown: {}", e);
                }
            }
            None => {
                tracing::debug!("Termination signal received before any endpoint was created");
            }
        }

        std::process::exit(0);
    });
}
