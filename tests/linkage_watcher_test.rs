//! Linkage watcher: liveness-poll to teardown behavior.

use endpoint_warden::host::{EndpointSpec, HostControlPlane, SimHost};
use endpoint_warden::linkage::{run_watcher, ProcessProbe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const FAST_POLL: Duration = Duration::from_millis(5);

/// Probe that reports the watched process alive for a fixed number of
/// polls, then gone.
struct CountdownProbe {
    remaining: AtomicUsize,
}

impl CountdownProbe {
    fn alive_for(polls: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(polls),
        }
    }
}

impl ProcessProbe for CountdownProbe {
    fn exists(&self, _pid: u32) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok()
    }
}

struct AlwaysAlive;

impl ProcessProbe for AlwaysAlive {
    fn exists(&self, _pid: u32) -> bool {
        true
    }
}

async fn started_endpoint(host: &SimHost, name: &str) {
    let spec = EndpointSpec {
        name: name.to_string(),
        root_path: "/var/www/site".into(),
        port: 8080,
        auto_start: true,
        pool: name.to_string(),
    };
    host.create_endpoint(&spec).await.unwrap();
    host.start(name).await.unwrap();
}

#[tokio::test]
async fn watcher_stops_endpoint_when_watched_process_dies() {
    let host = SimHost::new();
    started_endpoint(&host, "site1").await;
    let probe = CountdownProbe::alive_for(3);

    run_watcher(Arc::new(host.clone()), &probe, 4242, "site1", FAST_POLL)
        .await
        .unwrap();

    assert_eq!(host.stop_count("site1"), 1, "exactly one stop call");
}

#[tokio::test]
async fn watcher_never_stops_while_watched_process_lives() {
    let host = SimHost::new();
    started_endpoint(&host, "site1").await;

    let result = tokio::time::timeout(
        Duration::from_millis(100),
        run_watcher(Arc::new(host.clone()), &AlwaysAlive, 4242, "site1", FAST_POLL),
    )
    .await;

    assert!(
        result.is_err(),
        "watcher must keep polling while the process exists"
    );
    assert_eq!(host.stop_count("site1"), 0);
}

#[tokio::test]
async fn watcher_tolerates_missing_endpoint() {
    // The watcher looks the endpoint up fresh by name; a name the host no
    // longer knows is already satisfied, not a fault.
    let host = SimHost::new();
    let probe = CountdownProbe::alive_for(0);

    run_watcher(Arc::new(host.clone()), &probe, 4242, "site1", FAST_POLL)
        .await
        .unwrap();

    assert_eq!(host.stop_count("site1"), 0);
}

#[tokio::test]
async fn watcher_stops_only_the_named_endpoint() {
    let host = SimHost::new();
    started_endpoint(&host, "site1").await;
    started_endpoint(&host, "site2").await;
    let probe = CountdownProbe::alive_for(1);

    run_watcher(Arc::new(host.clone()), &probe, 4242, "site2", FAST_POLL)
        .await
        .unwrap();

    assert_eq!(host.stop_count("site2"), 1);
    assert_eq!(host.stop_count("site1"), 0);
}
