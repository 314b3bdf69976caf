//! Console layout for log events.
//!
//! Renders every event as
//! `[type] pid   - YYYY-MM-DD HH:mm:ss  [module] [LEVEL] message [line, column]`
//! where `module` is the event target and the position comes from the
//! `line`/`column` fields attached by [`Logger`](super::logging::Logger).

use std::fmt;

use colored::{Color, Colorize};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const FATAL_COLOR: Color = Color::TrueColor {
    r: 0xDD,
    g: 0x4C,
    b: 0x35,
};

/// Event formatter producing the fixed console layout.
#[derive(Debug, Clone)]
pub struct AppLayout {
    kind: String,
}

impl AppLayout {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Default for AppLayout {
    fn default() -> Self {
        Self::new("api")
    }
}

#[derive(Default)]
struct EventFields {
    message: String,
    extra: Vec<String>,
    line: Option<u64>,
    column: Option<u64>,
    fatal: bool,
}

impl Visit for EventFields {
    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "line" => self.line = Some(value),
            "column" => self.column = Some(value),
            name => self.extra.push(format!("{}={}", name, value)),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "fatal" {
            self.fatal = value;
        } else {
            self.extra.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            // already part of the message prefix
            "request_id" | "file" => {}
            name => self.extra.push(format!("{}={}", name, value)),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.extra.push(format!("{}={:?}", field.name(), value));
        }
    }
}

fn level_label(level: &Level, fatal: bool) -> &'static str {
    if fatal {
        "FATAL"
    } else {
        level.as_str()
    }
}

fn level_color(label: &str) -> Color {
    match label {
        "DEBUG" => Color::Green,
        "INFO" => Color::Cyan,
        "WARN" => Color::Yellow,
        "ERROR" => Color::Red,
        "FATAL" => FATAL_COLOR,
        _ => Color::BrightBlack,
    }
}

fn paint(text: String, color: Color, ansi: bool) -> String {
    if ansi {
        text.as_str().color(color).to_string()
    } else {
        text
    }
}

impl<S, N> FormatEvent<S, N> for AppLayout
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let ansi = writer.has_ansi_escapes();
        let meta = event.metadata();

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let mut message = fields.message;
        if !fields.extra.is_empty() {
            if !message.is_empty() {
                message.push(' ');
            }
            message.push_str(&fields.extra.join(" "));
        }

        let label = level_label(meta.level(), fields.fatal);
        let type_output = format!("[{}] {}   - ", self.kind, std::process::id());
        let date_output = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let module_output = format!("[{}] ", meta.target());
        let level_output = format!("[{}] {}", label, message);
        let position_output = match (fields.line, fields.column) {
            (Some(line), Some(column)) => format!(" [{}, {}]", line, column),
            _ => String::new(),
        };

        writeln!(
            writer,
            "{}{}  {}{}{}",
            paint(type_output, Color::Green, ansi),
            date_output,
            paint(module_output, Color::Yellow, ansi),
            paint(level_output, level_color(label), ansi),
            position_output
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::testing::capture;

    #[test]
    fn test_layout_shape() {
        let output = capture(|| {
            tracing::warn!(target: "orders", line = 7u32, column = 3u32, "stock low");
        });

        let pid = std::process::id().to_string();
        assert!(output.starts_with(&format!("[test] {}   - ", pid)));
        assert!(output.contains("  [orders] [WARN] stock low [7, 3]"));
    }

    #[test]
    fn test_no_position_without_fields() {
        let output = capture(|| tracing::info!(target: "boot", "ready"));
        assert!(output.trim_end().ends_with("[boot] [INFO] ready"));
    }

    #[test]
    fn test_extra_fields_are_appended() {
        let output = capture(|| tracing::info!(target: "boot", port = 8080u64, "listening"));
        assert!(output.contains("[INFO] listening port=8080"));
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(level_color("INFO"), Color::Cyan);
        assert_eq!(level_color("FATAL"), FATAL_COLOR);
        assert_eq!(level_color("TRACE"), Color::BrightBlack);
        assert_eq!(paint("x".into(), Color::Red, false), "x");
    }
}
