//! Watchdog behavior against scripted endpoint state sequences.

use endpoint_warden::host::{EndpointSpec, EndpointState, HostControlPlane, SimHost};
use endpoint_warden::{watchdog, SupervisionSession};
use std::sync::Arc;
use std::time::Duration;

const FAST_POLL: Duration = Duration::from_millis(5);

async fn live_endpoint(host: &SimHost, name: &str) -> SupervisionSession {
    let spec = EndpointSpec {
        name: name.to_string(),
        root_path: "/var/www/site".into(),
        port: 8080,
        auto_start: true,
        pool: name.to_string(),
    };
    host.create_endpoint(&spec).await.unwrap();
    SupervisionSession::new(Arc::new(host.clone()), name)
}

#[tokio::test]
async fn watchdog_stops_exactly_once_on_departure() {
    let host = SimHost::new();
    let session = live_endpoint(&host, "site1").await;
    host.script_states(
        "site1",
        [
            EndpointState::Starting,
            EndpointState::Started,
            EndpointState::Started,
            EndpointState::Stopping,
        ],
    );

    let departed = watchdog::watch(&session, FAST_POLL).await.unwrap();

    assert_eq!(departed, EndpointState::Stopping);
    assert_eq!(host.stop_count("site1"), 1, "exactly one stop call");
}

#[tokio::test]
async fn watchdog_keeps_polling_while_live() {
    let host = SimHost::new();
    let session = live_endpoint(&host, "site1").await;
    host.script_states("site1", [EndpointState::Starting, EndpointState::Started]);

    let result = tokio::time::timeout(
        Duration::from_millis(100),
        watchdog::watch(&session, FAST_POLL),
    )
    .await;

    assert!(
        result.is_err(),
        "watchdog must not return while the endpoint is live"
    );
    assert_eq!(host.stop_count("site1"), 0);
}

#[tokio::test]
async fn watchdog_treats_removed_endpoint_as_departed() {
    let host = SimHost::new();
    let session = live_endpoint(&host, "site1").await;
    host.remove_endpoint("site1").await.unwrap();

    let departed = watchdog::watch(&session, FAST_POLL).await.unwrap();

    assert_eq!(departed, EndpointState::Unknown);
    assert_eq!(host.stop_count("site1"), 0, "nothing left to stop");
}

#[tokio::test]
async fn concurrent_stop_triggers_are_safe() {
    // Signal handler, watchdog, and a co-located watcher may each request
    // a stop without ordering guarantees between them.
    let host = SimHost::new();
    let session = live_endpoint(&host, "site1").await;
    host.set_state("site1", EndpointState::Started);

    let (a, b, c) = tokio::join!(session.stop(), session.stop(), session.stop());
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert!(host.stop_count("site1") >= 1);
    assert_eq!(host.state("site1").await.unwrap(), EndpointState::Stopped);
}
