//! Polling watchdog for the supervised endpoint.
//!
//! A deliberately simple level-triggered poll: only the current sampled
//! state matters, so missed intermediate transitions are harmless. No
//! backoff and no jitter; polling host state for a single endpoint is
//! cheap.

use crate::error::Result;
use crate::host::EndpointState;
use crate::session::SupervisionSession;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Fixed interval between state polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Polls the endpoint's state every `interval` until it leaves the live
/// set ({starting, started}), then issues one idempotent stop and returns
/// the state that triggered teardown.
///
/// The loop has no other exit path; external termination (signal, kill)
/// is handled elsewhere.
pub async fn watch(session: &SupervisionSession, interval: Duration) -> Result<EndpointState> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let state = session.state().await;
        tracing::debug!("Current endpoint state: {}", state);

        if state.is_live() {
            continue;
        }

        tracing::info!(
            "Endpoint '{}' left the live set ({}), stopping",
            session.endpoint(),
            state
        );
        session.stop().await?;
        return Ok(state);
    }
}
