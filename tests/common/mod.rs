//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use turnstile::admission::AdmissionControl;
use turnstile::config::GatewayConfig;
use turnstile::http::HttpServer;
use turnstile::lifecycle::Shutdown;

/// Start a simple mock upstream that returns a fixed response.
pub async fn start_mock_upstream(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Gateway config pointing at the given upstream.
pub fn gateway_config(proxy_addr: SocketAddr, upstream_addr: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = proxy_addr.to_string();
    config.upstream.address = upstream_addr.to_string();
    config.observability.metrics_enabled = false;
    config
}

/// Spawn a gateway for the given config. Returns the admission state (for
/// registry inspection) and the shutdown handle the test must trigger.
pub async fn start_gateway(config: GatewayConfig) -> (Arc<AdmissionControl>, Shutdown) {
    let proxy_addr: SocketAddr = config.listener.bind_address.parse().unwrap();
    let admission = Arc::new(AdmissionControl::new(&config.rate_limit));
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config, admission.clone()).expect("valid gateway config");
    let listener = TcpListener::bind(proxy_addr).await.unwrap();

    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, &server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(300)).await;

    (admission, shutdown)
}

/// A reqwest client that never pools connections between tests.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
