use axum::extract::{Extension, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::controller::SYSTEM_TAG;
use crate::http::context::RequestContext;
use crate::http::response::{ErrorEnvelope, SuccessEnvelope};
use crate::http::server::AppState;
use crate::observability::Logger;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = SYSTEM_TAG,
    responses(
        (status = 200, description = "Service is up; `result` holds a SystemStatus", body = SuccessEnvelope),
        (status = 500, description = "Failure envelope (always sent with transport status 200)", body = ErrorEnvelope)
    ),
)]
pub async fn get_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<SystemStatus> {
    let uptime_secs = state.started_at.elapsed().as_secs();
    Logger::debug(&ctx.request_id, format_args!("status requested by {}", ctx.client_ip));

    Json(SystemStatus {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs,
    })
}
