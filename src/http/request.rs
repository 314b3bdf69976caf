//! Request snapshots for diagnostics.
//!
//! # Responsibilities
//! - Capture method, original URL, query and body of a request
//! - Collect path parameters once routing has matched
//! - Render fields for log records
//!
//! # Design Decisions
//! - Only JSON and URL-encoded bodies are decoded; other bodies show as `{}`
//! - Path parameters are filled in by a route layer through a shared slot,
//!   since the outer pipeline runs before routing

use std::sync::{Arc, OnceLock};

use axum::body::{Body, Bytes};
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::RawPathParams;
use axum::http::{header, HeaderMap, Method, Request, Uri};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::{Map, Value};

use crate::http::error::serialize_field;

/// Shared slot the route layer writes matched path parameters into.
#[derive(Debug, Clone, Default)]
pub struct PathParamsSlot(Arc<OnceLock<Value>>);

impl PathParamsSlot {
    pub fn get(&self) -> Value {
        self.0.get().cloned().unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn set(&self, params: Value) {
        let _ = self.0.set(params);
    }
}

/// Route layer recording the matched path parameters into the request's slot.
pub async fn capture_path_params(
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let (Ok(params), Some(slot)) = (params, request.extensions().get::<PathParamsSlot>()) {
        let map: Map<String, Value> = params
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        slot.set(Value::Object(map));
    }
    next.run(request).await
}

/// The standard request fields, captured at ingress.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub original_url: String,
    pub query: Value,
    pub body: Value,
    params: PathParamsSlot,
}

impl RequestSnapshot {
    pub fn capture(method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes, params: PathParamsSlot) -> Self {
        Self {
            method: method.clone(),
            original_url: uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string()),
            query: parse_form(uri.query().unwrap_or_default().as_bytes()),
            body: parse_body(headers, body),
            params,
        }
    }

    /// Path parameters, empty until routing has matched.
    pub fn params(&self) -> Value {
        self.params.get()
    }

    pub fn params_text(&self) -> String {
        serialize_field(&self.params())
    }

    pub fn query_text(&self) -> String {
        serialize_field(&self.query)
    }

    pub fn body_text(&self) -> String {
        serialize_field(&self.body)
    }
}

fn parse_form(raw: &[u8]) -> Value {
    let map: Map<String, Value> = url::form_urlencoded::parse(raw)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Value::Object(map)
}

fn parse_body(headers: &HeaderMap, body: &Bytes) -> Value {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if body.is_empty() {
        return Value::Object(Map::new());
    }

    if content_type.starts_with("application/json") || content_type.contains("+json") {
        serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        parse_form(body)
    } else {
        Value::Object(Map::new())
    }
}
