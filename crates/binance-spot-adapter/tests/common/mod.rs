/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for binance-spot-adapter tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Spawn a local WebSocket server that accepts any path, sends the given
/// greeting frames to each client shortly after the handshake, then idles
/// until the client closes. The send delay gives tests room to finish
/// registering handlers before the first frame lands.
///
/// Returns the `ws://` base URL and a counter of accepted connections.
#[allow(dead_code)]
pub async fn spawn_stream_server(greetings: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let connections = Arc::new(AtomicUsize::new(0));
    let accepted = Arc::clone(&connections);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _peer)) = listener.accept().await else {
                break;
            };
            accepted.fetch_add(1, Ordering::SeqCst);
            let greetings = greetings.clone();
            tokio::spawn(async move {
                let Ok(ws) = accept_async(stream).await else {
                    return;
                };
                let (mut write, mut read) = ws.split();
                if !greetings.is_empty() {
                    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
                }
                for greeting in greetings {
                    if write.send(Message::Text(greeting.into())).await.is_err() {
                        return;
                    }
                }
                while let Some(message) = read.next().await {
                    match message {
                        Ok(Message::Close(_)) | Err(_) => break,
                        _ => {}
                    }
                }
            });
        }
    });

    (format!("ws://{addr}"), connections)
}

/// Spawn a local WebSocket server that closes each connection right after
/// the handshake, simulating a remote-initiated teardown.
#[allow(dead_code)]
pub async fn spawn_closing_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        loop {
            let Ok((stream, _peer)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                let _ = ws.send(Message::Close(None)).await;
                // Drain until the client acknowledges the close.
                while let Some(message) = ws.next().await {
                    if message.is_err() {
                        break;
                    }
                }
            });
        }
    });

    format!("ws://{addr}")
}

/// Poll `condition` every few milliseconds until it holds or the timeout
/// elapses; panics with `description` on timeout.
#[allow(dead_code)]
pub async fn wait_until(description: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {description}");
}
