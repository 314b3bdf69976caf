//! Route handlers.
//!
//! Handlers return plain payloads or [`ApiError`](crate::http::error::ApiError);
//! the pipeline wraps both into envelopes.

pub mod echo;
pub mod system;

use axum::routing::{get, post};
use axum::Router;

use crate::http::server::AppState;

/// Tag grouping the operational endpoints in the API document.
pub const SYSTEM_TAG: &str = "system";

/// All API routes, before the pipeline is applied.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(system::get_status))
        .route("/api/echo", post(echo::post_echo))
}
