//! Request body limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size (inclusive)
//! - Buffer accepted bodies so diagnostics can show them
//!
//! # Design Decisions
//! - Limits checked before the handler runs
//! - The body is read up to the limit even when `Content-Length` already
//!   exceeds it, so the client finishes sending and receives the envelope
//! - Over-limit requests become a 413 client error

use axum::body::{Body, Bytes};
use axum::http::StatusCode;

use crate::http::error::ApiError;

/// Business code for oversized bodies.
pub const PAYLOAD_TOO_LARGE_CODE: &str = "PAYLOAD_TOO_LARGE";

fn too_large(limit: usize) -> ApiError {
    ApiError::client(
        StatusCode::PAYLOAD_TOO_LARGE,
        PAYLOAD_TOO_LARGE_CODE,
        format!("request entity too large (limit {} bytes)", limit),
    )
}

/// Read the whole body, failing if it exceeds `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, limit).await.map_err(|_| too_large(limit))
}
