//! Error classification and normalization.
//!
//! Every failure the API can report is an [`ApiError`]. Handlers return it
//! directly; responses produced elsewhere (routing misses, extractor
//! rejections, panics) are folded into it by [`ApiError::from_status`].
//! The pipeline then turns it into the failure envelope with
//! [`ApiError::classify`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;

/// Business code for any system error.
pub const SERVER_ERR_CODE: &str = "SERVER_ERROR";
/// Business code for client errors that did not name one.
pub const BAD_REQUEST_CODE: &str = "BAD_REQUEST";
/// The only message a client ever sees for a system error.
pub const SERVER_ERR_MSG: &str = "Internal server error";

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// A failure reported to the client through the failure envelope.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// A well-formed HTTP error meant for the caller.
    #[error("{status}: {message}")]
    Client {
        status: StatusCode,
        /// Business code; `BAD_REQUEST_CODE` when absent.
        code: Option<String>,
        message: String,
        /// Extra detail appended to the message, e.g. validation failures.
        detail: Option<Value>,
    },

    /// Anything else. The detail is logged, never sent.
    #[error("system error: {detail}")]
    System { detail: String },
}

/// Outcome of classifying an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_system: bool,
    pub http_status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn client(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            code: Some(code.into()),
            message: message.into(),
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_status(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_status(StatusCode::NOT_FOUND, message)
    }

    pub fn system(detail: impl std::fmt::Display) -> Self {
        Self::System {
            detail: detail.to_string(),
        }
    }

    /// Error for a bare status code, e.g. a framework rejection.
    ///
    /// 4xx statuses become client errors without a business code; all
    /// others are system errors.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        if status.is_client_error() {
            Self::Client {
                status,
                code: None,
                message,
                detail: None,
            }
        } else {
            let detail = if message.is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, message)
            };
            Self::System { detail }
        }
    }

    /// Attach detail to a client error. System errors are unchanged.
    pub fn with_detail(self, value: impl Into<Value>) -> Self {
        match self {
            Self::Client {
                status,
                code,
                message,
                ..
            } => Self::Client {
                status,
                code,
                message,
                detail: Some(value.into()),
            },
            system => system,
        }
    }

    /// Map to the (status, business code, message) the client sees.
    pub fn classify(&self) -> Classification {
        match self {
            Self::Client {
                status,
                code,
                message,
                detail,
            } => Classification {
                is_system: false,
                http_status: *status,
                code: code.clone().unwrap_or_else(|| BAD_REQUEST_CODE.to_string()),
                message: match detail {
                    Some(detail) => format!("{}. {}", message, render_detail(detail)),
                    None => message.clone(),
                },
            },
            Self::System { .. } => Classification {
                is_system: true,
                http_status: StatusCode::INTERNAL_SERVER_ERROR,
                code: SERVER_ERR_CODE.to_string(),
                message: SERVER_ERR_MSG.to_string(),
            },
        }
    }

    /// Full diagnostic text for logs.
    pub fn detail_text(&self) -> String {
        match self {
            Self::Client { detail: Some(detail), .. } => serialize_field(detail),
            Self::Client { detail: None, .. } => String::new(),
            Self::System { detail } => detail.clone(),
        }
    }
}

fn render_detail(detail: &Value) -> String {
    match detail {
        Value::Array(items) => items.iter().map(serialize_field).collect::<Vec<_>>().join(", "),
        other => serialize_field(other),
    }
}

/// Strings pass through; everything else becomes JSON text.
pub fn serialize_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Placeholder response carrying the error for the pipeline to normalize.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.classify().http_status;
        let mut response = (status, self.to_string()).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::system(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::system(err)
    }
}
