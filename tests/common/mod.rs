//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use hasty_test_server::config::ServerConfig;
use hasty_test_server::http::ServerError;
use hasty_test_server::lifecycle::ShutdownReason;
use hasty_test_server::net::{load_tls_config, BoundListeners};
use hasty_test_server::{FixtureServer, Shutdown};
use tokio::task::JoinHandle;

/// A server running on ephemeral loopback ports.
pub struct TestServer {
    pub http_addr: SocketAddr,
    pub https_addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<ShutdownReason, ServerError>>,
}

impl TestServer {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.http_addr, path)
    }

    /// TLS URL; `localhost` matches the fixture certificate's SAN.
    pub fn https_url(&self, path: &str) -> String {
        format!("https://localhost:{}{}", self.https_addr.port(), path)
    }

    /// Both URLs for `path`, plaintext first.
    pub fn urls(&self, path: &str) -> [String; 2] {
        [self.http_url(path), self.https_url(path)]
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = IpAddr::V4(Ipv4Addr::LOCALHOST);
    config.listener.http_port = 0;
    config.listener.https_port = 0;
    config.tls.identity_path = fixture_path("https.pfx");
    config
}

/// Start the server with the fixture identity on ephemeral ports.
pub async fn start_server() -> TestServer {
    start_server_with(test_config()).await
}

pub async fn start_server_with(config: ServerConfig) -> TestServer {
    let tls = load_tls_config(&config.tls).expect("fixture identity loads");
    let listeners = BoundListeners::bind(&config.listener)
        .await
        .expect("ephemeral ports bind");
    let http_addr = listeners.http_addr();
    let https_addr = listeners.https_addr();

    let shutdown = Shutdown::new();
    let server = FixtureServer::new(config, tls, shutdown.clone());
    let task = tokio::spawn(server.run(listeners));

    wait_until_accepting(http_addr).await;
    wait_until_accepting(https_addr).await;

    TestServer {
        http_addr,
        https_addr,
        shutdown,
        task,
    }
}

pub async fn wait_until_accepting(addr: SocketAddr) {
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {addr} never accepted connections");
}

/// Client that speaks to both listeners. The fixture certificate is self-signed.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .resolve("localhost", SocketAddr::from(([127, 0, 0, 1], 0)))
        .no_proxy()
        .build()
        .unwrap()
}
