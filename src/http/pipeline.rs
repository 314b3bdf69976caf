//! Request pipeline.
//!
//! One middleware runs every cross-cutting stage in a fixed order:
//!
//! ```text
//! enrich (RequestContext)
//!     → rate limit (per client IP)
//!     → body capture (size limit, snapshot for diagnostics)
//!     → handler
//!     → success: envelope + access entry
//!       failure: classify + diagnostic ERROR entry + failure envelope
//!     → status-bucketed request log
//! ```
//!
//! Failures are always normalized. Only a WebSocket handshake that the
//! handler answered with `101 Switching Protocols` skips the success envelope.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;

use crate::http::access_log;
use crate::http::context::{RequestContext, X_REQUEST_ID};
use crate::http::error::{serialize_field, ApiError};
use crate::http::request::{capture_path_params, PathParamsSlot, RequestSnapshot};
use crate::http::response::{envelope_response, ErrorEnvelope, SuccessEnvelope};
use crate::observability::Logger;
use crate::security::limits::read_body;
use crate::security::RateLimiter;

/// Settings shared by every pipeline invocation.
#[derive(Clone)]
pub struct PipelineState {
    pub limiter: Option<Arc<RateLimiter>>,
    pub max_body_bytes: usize,
    pub trust_proxy_hops: usize,
}

/// Kind of request as far as response shaping is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Plain request/response, including other `Upgrade` offers such as h2c.
    Http,
    /// WebSocket handshake.
    WebSocket,
}

impl RequestKind {
    pub fn of(headers: &HeaderMap) -> Self {
        let websocket = headers
            .get_all(header::UPGRADE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|protocol| protocol.trim().eq_ignore_ascii_case("websocket"));

        if websocket {
            RequestKind::WebSocket
        } else {
            RequestKind::Http
        }
    }

    /// Whether `response` completes a protocol switch and must go out untouched.
    pub fn switched(self, response: &Response) -> bool {
        self == RequestKind::WebSocket && response.status() == StatusCode::SWITCHING_PROTOCOLS
    }
}

/// Wrap an API router in the pipeline.
///
/// `router` must already contain its routes.
pub fn apply<S>(router: Router<S>, state: PipelineState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let max_body_bytes = state.max_body_bytes;
    router
        .fallback(not_found)
        .route_layer(middleware::from_fn(capture_path_params))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(state, handle))
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot {} {}", method, uri.path()))
}

/// The pipeline middleware.
pub async fn handle(State(state): State<PipelineState>, request: Request<Body>, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ctx = RequestContext::from_headers(request.headers(), peer, state.trust_proxy_hops);
    let kind = RequestKind::of(request.headers());
    let params = PathParamsSlot::default();

    let (mut parts, body) = request.into_parts();

    let admitted = match &state.limiter {
        Some(limiter) => limiter.admit(&ctx.client_ip),
        None => Ok(()),
    };

    let body = match admitted {
        Ok(()) => read_body(body, state.max_body_bytes).await,
        Err(err) => Err(err),
    };

    let bytes = match body {
        Ok(bytes) => bytes,
        Err(err) => {
            let snapshot = RequestSnapshot::capture(&parts.method, &parts.uri, &parts.headers, &Bytes::new(), params);
            let (response, status) = reject(&ctx, &snapshot, err);
            access_log::record(&ctx, &snapshot, status);
            return response;
        }
    };

    let snapshot = RequestSnapshot::capture(&parts.method, &parts.uri, &parts.headers, &bytes, params.clone());
    parts.extensions.insert(ctx.clone());
    parts.extensions.insert(params);

    let started = Instant::now();
    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    let (response, status) = if kind.switched(&response) {
        let status = response.status();
        (response, status)
    } else {
        shape(&ctx, &snapshot, response, started).await
    };

    access_log::record(&ctx, &snapshot, status);
    response
}

/// Turn a handler response into an envelope, returning it with the outcome status.
async fn shape(
    ctx: &RequestContext,
    snapshot: &RequestSnapshot,
    response: Response,
    started: Instant,
) -> (Response, StatusCode) {
    if let Some(err) = response.extensions().get::<ApiError>().cloned() {
        return reject(ctx, snapshot, err);
    }

    let status = response.status();
    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => return reject(ctx, snapshot, ApiError::system(err)),
    };

    if status.is_client_error() || status.is_server_error() {
        let message = if bytes.is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            String::from_utf8_lossy(&bytes).into_owned()
        };
        return reject(ctx, snapshot, ApiError::from_status(status, message));
    }

    let result = decode_result(&parts.headers, &bytes);
    let elapsed = started.elapsed().as_millis();

    Logger::access(
        &ctx.request_id,
        format!(
            "requestId: {}\nresult: {}\ncode: {}\ntime: {}ms",
            ctx.request_id,
            result.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "null".to_string()),
            status.as_u16(),
            elapsed
        ),
    );

    let mut enveloped = envelope_response(SuccessEnvelope::new(status, result, &ctx.request_id), &ctx.request_id);
    for (name, value) in parts.headers.iter() {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH || name == X_REQUEST_ID {
            continue;
        }
        enveloped.headers_mut().append(name.clone(), value.clone());
    }

    (enveloped, status)
}

fn decode_result(headers: &HeaderMap, bytes: &Bytes) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json") || ct.contains("+json"))
        .unwrap_or(false);

    if is_json {
        if let Ok(value) = serde_json::from_slice(bytes) {
            return Some(value);
        }
    }

    Some(Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Terminal failure handling: log the diagnostic record and build the failure envelope.
fn reject(ctx: &RequestContext, snapshot: &RequestSnapshot, err: ApiError) -> (Response, StatusCode) {
    let classification = err.classify();

    Logger::error(
        &ctx.request_id,
        format!(
            "requestId: {},\n  timestamp: {},\n  ip: {},\n  reqUrl: {},\n  reqMethod: {},\n  code: {},\n  params: {},\n  query: {},\n  body: {},\n  statusCode: {},\n  errorMsg: {},\n  detail: {}",
            ctx.request_id,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            ctx.client_ip,
            snapshot.original_url,
            snapshot.method,
            classification.code,
            snapshot.params_text(),
            snapshot.query_text(),
            snapshot.body_text(),
            classification.http_status.as_u16(),
            serialize_field(&Value::String(classification.message.clone())),
            err.detail_text(),
        ),
    );

    let body = ErrorEnvelope {
        request_id: ctx.request_id.clone(),
        code: classification.code,
        msg: classification.message,
    };

    (envelope_response(body, &ctx.request_id), classification.http_status)
}
