//! # Console Output
//!
//! Every diagnostic is a tracing event rendered to stdout with a status
//! glyph in front:
//!
//! ```text
//! ❌ File not found: productos_rows.csv
//! ⚠️ Skipping operation: row 7: product P404 (operation op-9) not found in products row=7 operation="op-9"
//! ℹ️ Products loaded source="productos_rows.csv" loaded=120 skipped=1
//! ✅ File written: facturas_a_importar.csv (4 rows)
//! ```
//!
//! Success lines are not log events; they go through [`success`].

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Glyph for a log level.
pub fn glyph(level: Level) -> &'static str {
    match level {
        Level::ERROR => "❌",
        Level::WARN => "⚠️",
        Level::INFO => "ℹ️",
        Level::DEBUG | Level::TRACE => "·",
    }
}

/// Event formatter: `<glyph> <message> <fields>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphFormat;

impl<S, N> FormatEvent<S, N> for GlyphFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", glyph(*event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the console subscriber.
///
/// Default filter is `info`; `RUST_LOG` overrides it.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .event_format(GlyphFormat)
        .init();
}

/// Prints a success line.
pub fn success(message: impl fmt::Display) {
    println!("✅ {message}");
}
