//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//! MYSQL_* environment (.env honoured)
//!     → loader.rs (typed overlay)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_mysql_from_env, ConfigError};
pub use schema::{
    DocsConfig, LimitsConfig, ListenerConfig, LoggingConfig, MysqlConfig, RateLimitConfig,
    ServerConfig,
};
