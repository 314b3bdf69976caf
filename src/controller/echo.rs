use axum::extract::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::controller::SYSTEM_TAG;
use crate::http::context::RequestContext;
use crate::http::response::{ErrorEnvelope, SuccessEnvelope};
use crate::http::ValidatedJson;
use crate::observability::Logger;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EchoRequest {
    #[validate(length(min = 1, max = 1024, message = "message must be between 1 and 1024 characters"))]
    pub message: String,
    /// How many times to repeat the message (default 1).
    #[validate(range(min = 1, max = 10, message = "repeat must be between 1 and 10"))]
    pub repeat: Option<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EchoResponse {
    pub message: String,
}

/// Round-trips a validated payload; useful for smoke-testing a deployment.
#[utoipa::path(
    post,
    path = "/api/echo",
    tag = SYSTEM_TAG,
    request_body = EchoRequest,
    responses(
        (status = 200, description = "`result` holds an EchoResponse", body = SuccessEnvelope),
        (status = 400, description = "Validation failed (sent with transport status 200)", body = ErrorEnvelope)
    ),
)]
pub async fn post_echo(
    Extension(ctx): Extension<RequestContext>,
    ValidatedJson(payload): ValidatedJson<EchoRequest>,
) -> Json<EchoResponse> {
    let repeat = usize::from(payload.repeat.unwrap_or(1));
    Logger::debug(&ctx.request_id, format_args!("echo x{}", repeat));

    Json(EchoResponse {
        message: vec![payload.message.as_str(); repeat].join(" "),
    })
}
