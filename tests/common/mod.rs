//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use chomp_gateway::chomp::{self, ChompClient, ChompGateway};
use chomp_gateway::config::{ConnectConfig, UpstreamConfig};
use chomp_gateway::lifecycle::startup;
use chomp_gateway::Server;

/// A programmable stand-in for the Chomp REST API.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request targets (path and query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock upstream that answers every request with `f(target)`.
pub async fn start_mock_upstream<F>(f: F) -> MockUpstream
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let Some(target) = read_request_target(&mut socket).await else {
                            return;
                        };
                        recorded.lock().unwrap().push(target.clone());

                        let (status, body) = f(&target);
                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream { addr, requests }
}

/// Read a request head and return its target, e.g. `/food/branded/barcode.php?...`.
async fn read_request_target(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

/// Start the full gateway on an ephemeral port, talking to `upstream_base_url`.
pub async fn start_gateway(upstream_base_url: &str) -> (Server, SocketAddr) {
    let upstream = UpstreamConfig {
        base_url: upstream_base_url.to_string(),
    };
    let gateway = ChompGateway::new(ChompClient::new(upstream));
    let server = startup::start(
        ConnectConfig::new("127.0.0.1", 0),
        &chomp::module_options(),
        gateway,
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    // Give the accept loop a moment to be scheduled.
    tokio::time::sleep(Duration::from_millis(20)).await;
    (server, addr)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A full-schema upstream document with every field set.
pub fn fixture() -> String {
    std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/food.json"))
        .unwrap()
}

/// An upstream document with one minimal item per barcode.
pub fn items_payload(barcodes: &[&str]) -> String {
    let items: Vec<_> = barcodes
        .iter()
        .map(|b| serde_json::json!({ "barcode": b, "name": format!("food {b}") }))
        .collect();
    serde_json::json!({ "items": items }).to_string()
}
