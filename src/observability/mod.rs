//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages, controllers, bootstrap:
//!     → logging.rs (Logger: leveled calls + access/mysql channels)
//!     → tracing events (target = channel)
//!     → layout.rs (fixed console layout, level colours)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every entry
//! - Filtering via `RUST_LOG`, falling back to config
//! - File appenders are left to the deployment (stdout collection)

pub mod layout;
pub mod logging;

pub use layout::AppLayout;
pub use logging::{CallSite, LogLevel, Logger};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(config.ansi)
                .event_format(AppLayout::new(config.layout_type.clone())),
        )
        .try_init();
}
