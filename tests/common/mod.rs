//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use filter_gateway::config::GatewayConfig;
use filter_gateway::gateway::Gateway;
use filter_gateway::lifecycle::Shutdown;
use filter_gateway::HttpServer;

/// A mock upstream with a call counter.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicU32>,
}

impl MockUpstream {
    pub fn upstream_uri(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

/// Start a mock upstream that answers every request with a fixed status and
/// body after an optional delay. Each accepted request bumps the counter.
pub async fn start_mock_upstream(
    status: u16,
    body: &'static str,
    delay: Duration,
) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
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

    MockUpstream { addr, calls }
}

/// Start the gateway on an ephemeral port and return its address, the
/// gateway handle (for reloads) and the shutdown coordinator.
#[allow(dead_code)]
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Arc<Gateway>, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (_config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(&config).expect("config should validate");
    let gateway = server.gateway();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    // Give the acceptor a moment to come up.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, gateway, shutdown)
}
