//! API scaffold
//!
//! Boilerplate HTTP backend: a fixed request pipeline that every API route
//! runs inside, plus the bootstrap that configures and serves it.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ server (trace, docs)
//!                          │
//!                          ▼
//!                      pipeline ── context ── rate limit ── body limit
//!                          │
//!                          ▼
//!                      controller handlers
//!                          │
//!                          ▼
//!     Client Response  envelope (success | failure, transport 200)
//!     ◀───────────────     + access entry + status-bucketed request log
//!
//!     Cross-cutting: config (file + MYSQL_* env), observability (Logger),
//!                    lifecycle (startup, signals, shutdown)
//! ```

pub mod config;
pub mod controller;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
