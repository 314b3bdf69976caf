//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (peer address attached)
//!     → server.rs (TraceLayer, docs router merged outside the pipeline)
//!     → pipeline.rs
//!         → context.rs (request id, client IP)
//!         → security (rate limit, body limit)
//!         → request.rs (snapshot for diagnostics, path params)
//!         → controller handlers
//!         → response.rs (success envelope) | error.rs (failure envelope)
//!         → access_log.rs (status-bucketed record)
//!     → client (transport status 200)
//! ```
//!
//! # Design Decisions
//! - One middleware owns stage ordering; nothing depends on registration order
//! - Errors are values (`ApiError`), never exceptions crossing layers
//! - Protocol upgrades bypass the envelope

pub mod access_log;
pub mod context;
pub mod docs;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use error::{ApiError, ApiResult};
pub use extract::ValidatedJson;
pub use server::{AppState, HttpServer};
