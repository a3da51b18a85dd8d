//! Warmup probe contract tests against real local HTTP fixtures.

use endpoint_warden::{warmup, WarmupOutcome};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves exactly one connection with a canned HTTP response and returns
/// the bound port.
async fn serve_once(response: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    port
}

#[tokio::test]
async fn warmup_returns_ready_on_200() {
    let port =
        serve_once("HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\n\r\nready").await;

    let outcome = warmup(port, "/healthz", Duration::from_secs(5)).await;

    assert!(outcome.is_ready());
}

#[tokio::test]
async fn warmup_fails_on_503_with_status() {
    let port = serve_once(
        "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 11\r\nconnection: close\r\n\r\nwarming up\n",
    )
    .await;

    match warmup(port, "/healthz", Duration::from_secs(5)).await {
        WarmupOutcome::Failed { status, .. } => assert_eq!(status, Some(503)),
        WarmupOutcome::Ready => panic!("503 must not count as ready"),
    }
}

#[tokio::test]
async fn warmup_times_out_without_status() {
    // Accepts the connection but never answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            // Hold the socket open well past the probe timeout.
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        }
    });

    match warmup(port, "/healthz", Duration::from_millis(500)).await {
        WarmupOutcome::Failed { status, .. } => assert_eq!(status, None),
        WarmupOutcome::Ready => panic!("a silent server must not count as ready"),
    }
}

#[tokio::test]
async fn warmup_fails_on_connection_refused() {
    // Bind then drop the listener to learn a port that is very likely closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    match warmup(port, "/healthz", Duration::from_secs(1)).await {
        WarmupOutcome::Failed { status, .. } => assert_eq!(status, None),
        WarmupOutcome::Ready => panic!("a closed port must not count as ready"),
    }
}
