//! Structured logging.
//!
//! # Responsibilities
//! - Leveled log calls tagged with a correlation id
//! - Named channels for access and database logs
//! - Call-site location on every entry
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging; channels are tracing targets
//! - The level is a property of each call, never shared state
//! - Call sites come from `#[track_caller]`, resolved at compile time

use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Target for general application logs.
pub const APP_TARGET: &str = "app";
/// Target for access logs.
pub const HTTP_TARGET: &str = "http";
/// Target for database logs.
pub const MYSQL_TARGET: &str = "mysql";

/// Severity of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// Rendered as an ERROR event carrying `fatal = true`.
    Fatal,
}

/// Source location of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl CallSite {
    /// Location of whoever called the (track_caller) function.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        let file = Path::new(location.file())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(location.file());
        Self {
            file,
            line: location.line(),
            column: location.column(),
        }
    }

    /// Message prefix identifying the request and the call site.
    pub fn prefix(&self, request_id: &str) -> String {
        format!(
            "[requestId:{}] {}(line: {}, column: {}): ",
            request_id, self.file, self.line, self.column
        )
    }
}

/// Entry point for application logging.
///
/// ```ignore
/// Logger::info(&ctx.request_id, "user created");
/// Logger::access(&ctx.request_id, format_args!("took {}ms", elapsed));
/// ```
pub struct Logger;

impl Logger {
    #[track_caller]
    pub fn trace(request_id: &str, content: impl fmt::Display) {
        Self::log(LogLevel::Trace, request_id, content);
    }

    #[track_caller]
    pub fn debug(request_id: &str, content: impl fmt::Display) {
        Self::log(LogLevel::Debug, request_id, content);
    }

    #[track_caller]
    pub fn info(request_id: &str, content: impl fmt::Display) {
        Self::log(LogLevel::Info, request_id, content);
    }

    #[track_caller]
    pub fn warn(request_id: &str, content: impl fmt::Display) {
        Self::log(LogLevel::Warn, request_id, content);
    }

    #[track_caller]
    pub fn error(request_id: &str, content: impl fmt::Display) {
        Self::log(LogLevel::Error, request_id, content);
    }

    #[track_caller]
    pub fn fatal(request_id: &str, content: impl fmt::Display) {
        Self::log(LogLevel::Fatal, request_id, content);
    }

    /// Access channel (`http` target), always INFO.
    #[track_caller]
    pub fn access(request_id: &str, content: impl fmt::Display) {
        Self::access_at(CallSite::caller(), request_id, content);
    }

    /// Access channel with an explicitly supplied call site.
    pub fn access_at(site: CallSite, request_id: &str, content: impl fmt::Display) {
        let message = format!("{}\n{}", site.prefix(request_id), content);
        tracing::info!(
            target: HTTP_TARGET,
            request_id,
            file = site.file,
            line = site.line,
            column = site.column,
            "{}",
            message
        );
    }

    /// Database channel (`mysql` target), always INFO.
    #[track_caller]
    pub fn mysql(request_id: &str, content: impl fmt::Display) {
        let site = CallSite::caller();
        let message = format!("{}\n{}", site.prefix(request_id), content);
        tracing::info!(
            target: MYSQL_TARGET,
            request_id,
            file = site.file,
            line = site.line,
            column = site.column,
            "{}",
            message
        );
    }

    /// Log on the application channel at an explicit level.
    #[track_caller]
    pub fn log(level: LogLevel, request_id: &str, content: impl fmt::Display) {
        Self::log_at(level, CallSite::caller(), request_id, content);
    }

    /// Log with an explicitly supplied call site.
    pub fn log_at(level: LogLevel, site: CallSite, request_id: &str, content: impl fmt::Display) {
        let message = format!("{}\n{}", site.prefix(request_id), content);

        // tracing needs the level as a constant at each callsite
        macro_rules! emit {
            ($level:expr $(, $extra:ident = $val:expr)?) => {
                tracing::event!(
                    target: APP_TARGET,
                    $level,
                    request_id,
                    file = site.file,
                    line = site.line,
                    column = site.column,
                    $($extra = $val,)?
                    "{}",
                    message
                )
            };
        }

        match level {
            LogLevel::Trace => emit!(tracing::Level::TRACE),
            LogLevel::Debug => emit!(tracing::Level::DEBUG),
            LogLevel::Info => emit!(tracing::Level::INFO),
            LogLevel::Warn => emit!(tracing::Level::WARN),
            LogLevel::Error => emit!(tracing::Level::ERROR),
            LogLevel::Fatal => emit!(tracing::Level::ERROR, fatal = true),
        }
    }
}
