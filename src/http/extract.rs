//! Validating extractors.
//!
//! # Responsibilities
//! - Deserialize JSON request bodies
//! - Run field validation declared with `#[derive(Validate)]`
//! - Report every failed rule in one client error
//!
//! # Design Decisions
//! - A failed rule becomes a 400 `BAD_REQUEST` whose detail is the list of
//!   messages, so the failure envelope reads `"Validation failed. <a>, <b>"`
//! - Messages are ordered by field name to keep responses stable
//! - Malformed JSON keeps axum's rejection status and text

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::http::error::ApiError;

/// Message of the client error raised for failed validation.
pub const VALIDATION_FAILED_MSG: &str = "Validation failed";

/// JSON body that passed validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::from_status(rejection.status(), rejection.body_text()))?;

        value.validate().map_err(validation_error)?;

        Ok(Self(value))
    }
}

/// Fold every field failure into one client error.
pub fn validation_error(errors: ValidationErrors) -> ApiError {
    ApiError::bad_request(VALIDATION_FAILED_MSG).with_detail(Value::Array(
        messages(&errors).into_iter().map(Value::String).collect(),
    ))
}

fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| match &failure.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, failure.code),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct NewUser {
        #[validate(length(min = 1, message = "name should not be empty"))]
        name: String,
        #[validate(range(min = 0, max = 150))]
        age: i64,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(user) = ValidatedJson::<NewUser>::from_request(json_request(r#"{"name":"ann","age":30}"#), &())
            .await
            .unwrap();
        assert_eq!(user.name, "ann");
        assert_eq!(user.age, 30);
    }

    #[tokio::test]
    async fn test_every_failed_rule_reported() {
        let err = ValidatedJson::<NewUser>::from_request(json_request(r#"{"name":"","age":200}"#), &())
            .await
            .unwrap_err();
        let c = err.classify();

        assert_eq!(c.http_status, StatusCode::BAD_REQUEST);
        assert_eq!(c.code, "BAD_REQUEST");
        assert_eq!(c.message, "Validation failed. age is invalid (range), name should not be empty");
    }

    #[tokio::test]
    async fn test_malformed_json_keeps_rejection_status() {
        let err = ValidatedJson::<NewUser>::from_request(json_request("{oops"), &())
            .await
            .unwrap_err();
        let c = err.classify();

        assert_eq!(c.http_status, StatusCode::BAD_REQUEST);
        assert!(!c.is_system);
    }
}
