//! Shared utilities for integration tests.

use std::net::SocketAddr;

use api_scaffold::http::AppState;
use api_scaffold::{HttpServer, ServerConfig, Shutdown};
use axum::Router;
use tokio::net::TcpListener;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the built-in routes with `config`.
#[allow(dead_code)]
pub async fn spawn(config: ServerConfig) -> TestServer {
    start(HttpServer::new(config)).await
}

/// Start `routes` with `config`.
#[allow(dead_code)]
pub async fn spawn_with_routes(config: ServerConfig, routes: Router<AppState>) -> TestServer {
    start(HttpServer::with_routes(config, routes)).await
}

async fn start(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.signalled();

    tokio::spawn(async move {
        let _ = server.run_until(listener, signal).await;
    });

    TestServer { addr, shutdown }
}
