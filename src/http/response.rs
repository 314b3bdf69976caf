//! Response envelopes.
//!
//! # Responsibilities
//! - Define the success and failure body shapes
//! - Remap 201 to 200 in the success `code`
//! - Build the final transport-200 JSON response
//!
//! # Design Decisions
//! - Business outcome lives in `code`; the transport status is always 200
//! - Field names are part of the wire contract (`reqId` vs `requestId`)

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::http::context::X_REQUEST_ID;

/// Body returned for a successful handler result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SuccessEnvelope {
    /// Handler status, with 201 reported as 200.
    pub code: u16,
    /// Handler result, `null` when it produced nothing.
    #[schema(value_type = Object)]
    pub result: Value,
    /// Correlation id.
    #[serde(rename = "reqId")]
    pub req_id: String,
}

impl SuccessEnvelope {
    pub fn new(status: StatusCode, result: Option<Value>, req_id: impl Into<String>) -> Self {
        Self {
            code: success_code(status),
            result: result.unwrap_or(Value::Null),
            req_id: req_id.into(),
        }
    }
}

/// Body returned for any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Correlation id.
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// Business error code.
    pub code: String,
    /// Client-facing message.
    pub msg: String,
}

/// Business code reported for a successful status.
pub fn success_code(status: StatusCode) -> u16 {
    if status == StatusCode::CREATED {
        StatusCode::OK.as_u16()
    } else {
        status.as_u16()
    }
}

/// Serialize `body` as a transport-200 JSON response tagged with the request id.
pub fn envelope_response<T: Serialize>(body: T, request_id: &str) -> Response {
    let mut response = (StatusCode::OK, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
        .headers_mut()
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    response
}
