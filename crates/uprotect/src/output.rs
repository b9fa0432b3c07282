//! Output formatting: table, JSON, YAML, plain.
//!
//! Every command renders through `render_list` or `render_single` so the
//! `--output` flag behaves identically everywhere. This module also holds
//! the small field formatters the row types share (timestamps, uptimes,
//! on/off cells).

use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Utc};
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// The serde-backed formats, shared by list and single rendering.
/// `None` means the format needs caller-supplied presentation instead.
fn render_serialized<T>(format: OutputFormat, data: &T) -> Option<String>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => Some(serde_json::to_string_pretty(data).expect("serializable data")),
        OutputFormat::JsonCompact => Some(serde_json::to_string(data).expect("serializable data")),
        OutputFormat::Yaml => Some(serde_yaml::to_string(data).expect("serializable data")),
        OutputFormat::Table | OutputFormat::Plain => None,
    }
}

/// Render a list of items in the chosen format.
///
/// Table mode builds rows with `to_row` and the `Tabled` derive; plain
/// mode emits `id_fn` per item, one per line.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    if let Some(out) = render_serialized(format, data) {
        return out;
    }
    if format == OutputFormat::Plain {
        return data.iter().map(&id_fn).collect::<Vec<_>>().join("\n");
    }
    let rows: Vec<R> = data.iter().map(to_row).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

/// Render a single item in the chosen format.
///
/// Detail views don't go through `Tabled`; table mode uses `detail_fn`,
/// which returns a pre-formatted multi-line string.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    if let Some(out) = render_serialized(format, data) {
        return out;
    }
    if format == OutputFormat::Plain {
        return id_fn(data);
    }
    detail_fn(data)
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if !quiet && !output.is_empty() {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{output}");
    }
}

// ── Field formatters ─────────────────────────────────────────────────

/// Local-time cell for an optional timestamp; `-` when absent.
pub fn ts(t: Option<DateTime<Utc>>) -> String {
    t.map_or_else(
        || "-".to_owned(),
        |t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

/// Human uptime cell (`3days 2h 7m`) for an optional start time.
pub fn uptime(since: Option<DateTime<Utc>>) -> String {
    let Some(since) = since else {
        return "-".to_owned();
    };
    let secs = u64::try_from((Utc::now() - since).num_seconds()).unwrap_or(0);
    // Truncate to whole minutes so the cell doesn't tick every render.
    let rounded = if secs >= 60 { secs - secs % 60 } else { secs };
    humantime::format_duration(std::time::Duration::from_secs(rounded)).to_string()
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
