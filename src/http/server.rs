//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router: API routes inside the pipeline, docs outside
//! - Wire up shared state (config, rate limiter, start time)
//! - Bind to a listener and serve with peer addresses available
//! - Shut down gracefully

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::controller;
use crate::http::docs;
use crate::http::pipeline::{self, PipelineState};
use crate::lifecycle::shutdown_signal;
use crate::observability::Logger;
use crate::security::RateLimiter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub limiter: Option<Arc<RateLimiter>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let limiter = RateLimiter::from_config(&config.rate_limit).map(Arc::new);
        Self {
            config: Arc::new(config),
            limiter,
            started_at: Instant::now(),
        }
    }

    fn pipeline(&self) -> PipelineState {
        PipelineState {
            limiter: self.limiter.clone(),
            max_body_bytes: self.config.limits.max_body_bytes,
            trust_proxy_hops: self.config.listener.trust_proxy_hops,
        }
    }
}

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Server exposing the built-in routes.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_routes(config, controller::routes())
    }

    /// Server exposing `routes`. The routes run inside the pipeline.
    pub fn with_routes(config: ServerConfig, routes: Router<AppState>) -> Self {
        let state = AppState::new(config);
        let router = Self::build_router(&state, routes);
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: &AppState, routes: Router<AppState>) -> Router {
        let api = pipeline::apply(routes, state.pipeline()).with_state(state.clone());

        let app = if state.config.docs.enabled {
            Router::new().merge(docs::router::<()>(&state.config.docs)).merge(api)
        } else {
            api
        };

        app.layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        Logger::info("system", format_args!("HTTP server listening on {}", addr));
        if self.state.config.docs.enabled {
            Logger::info(
                "system",
                format_args!("API docs at http://{}{}", addr, self.state.config.docs.path),
            );
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        Logger::info("system", "HTTP server stopped");
        Ok(())
    }
}
