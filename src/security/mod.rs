//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (context already attached):
//!     → rate_limit.rs (per-client fixed window)
//!     → limits.rs (body size, buffered for diagnostics)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Rejections are ordinary client errors, enveloped like any other
//! - Client identity is the proxy-resolved IP

pub mod limits;
pub mod rate_limit;

pub use rate_limit::RateLimiter;
