//! Status-bucketed request log.
//!
//! Second logging pass, independent of the envelope's access entry. The
//! status it sees is the outcome status recorded before normalization,
//! since every response leaves with transport status 200.

use axum::http::StatusCode;

use crate::http::context::RequestContext;
use crate::http::request::RequestSnapshot;
use crate::observability::{CallSite, LogLevel, Logger};

/// Which log a request record goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Error,
    Warn,
    Access,
}

impl Bucket {
    pub fn for_status(status: StatusCode) -> Self {
        match status.as_u16() {
            500.. => Bucket::Error,
            400..=499 => Bucket::Warn,
            _ => Bucket::Access,
        }
    }
}

/// Render the request record.
pub fn format_record(ctx: &RequestContext, snapshot: &RequestSnapshot, status: StatusCode) -> String {
    format!(
        " >>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>
    Request
    timestamp: {}
    requestId: {}
    Request original url: {}
    Method: {}
    IP: {}
    Status code: {}
    Params: {}
    Query: {}
    Body: {}
  >>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        ctx.request_id,
        snapshot.original_url,
        snapshot.method,
        ctx.client_ip,
        status.as_u16(),
        snapshot.params_text(),
        snapshot.query_text(),
        snapshot.body_text(),
    )
}

/// Emit the request record to the bucket matching `status`.
#[track_caller]
pub fn record(ctx: &RequestContext, snapshot: &RequestSnapshot, status: StatusCode) {
    let site = CallSite::caller();
    let record = format_record(ctx, snapshot, status);
    match Bucket::for_status(status) {
        Bucket::Error => Logger::log_at(LogLevel::Error, site, &ctx.request_id, record),
        Bucket::Warn => Logger::log_at(LogLevel::Warn, site, &ctx.request_id, record),
        Bucket::Access => Logger::access_at(site, &ctx.request_id, record),
    }
}
