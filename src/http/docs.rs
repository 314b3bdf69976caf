//! Generated API documentation.
//!
//! The OpenAPI document is built from route annotations and mounted with
//! Swagger UI outside the request pipeline, so documentation responses are
//! never enveloped.

use axum::Router;
use utoipa::openapi::tag::TagBuilder;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::DocsConfig;
use crate::controller::echo::{self, EchoRequest, EchoResponse};
use crate::controller::system::{self, SystemStatus};
use crate::http::response::{ErrorEnvelope, SuccessEnvelope};

#[derive(OpenApi)]
#[openapi(
    paths(system::get_status, echo::post_echo),
    components(schemas(SuccessEnvelope, ErrorEnvelope, SystemStatus, EchoRequest, EchoResponse))
)]
pub struct ApiDoc;

/// The OpenAPI document with title, description, version and tags from config.
pub fn openapi(config: &DocsConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = config.title.clone();
    doc.info.description = Some(config.description.clone());
    doc.info.version = config.version.clone();

    if !config.tags.is_empty() {
        let tags = doc.tags.get_or_insert_with(Vec::new);
        for name in &config.tags {
            tags.push(TagBuilder::new().name(name.as_str()).build());
        }
    }

    doc
}

/// Swagger UI at `config.path`, JSON document at `config.json_path()`.
pub fn router<S>(config: &DocsConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new(config.path.clone())
        .url(config.json_path(), openapi(config))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_uses_config() {
        let config = DocsConfig {
            title: "Orders".into(),
            description: "Order service".into(),
            version: "2.1.0".into(),
            tags: vec!["orders".into()],
            ..DocsConfig::default()
        };
        let doc = openapi(&config);

        assert_eq!(doc.info.title, "Orders");
        assert_eq!(doc.info.description.as_deref(), Some("Order service"));
        assert_eq!(doc.info.version, "2.1.0");
        assert!(doc.paths.paths.contains_key("/api/status"));
        assert!(doc.paths.paths.contains_key("/api/echo"));
        let tags = doc.tags.unwrap_or_default();
        assert!(tags.iter().any(|t| t.name == "orders"));
    }

    #[test]
    fn test_envelopes_in_components() {
        let doc = openapi(&DocsConfig::default());
        let schemas = doc.components.map(|c| c.schemas).unwrap_or_default();
        assert!(schemas.contains_key("SuccessEnvelope"));
        assert!(schemas.contains_key("ErrorEnvelope"));
        assert!(schemas.contains_key("SystemStatus"));
    }
}
