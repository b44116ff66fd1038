// SPDX-License-Identifier: Apache-2.0 OR MIT
// Output adapters - render log records to a stream

use chrono::Local;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use super::{LogRecord, Severity};
use crate::config::ConfigError;

/// Sink for emitted log records
///
/// Adapters run synchronously on the logging thread, in registration order,
/// and receive the same record. Any closure taking `&LogRecord` is an adapter.
pub trait OutputAdapter: Send + Sync {
    fn write(&self, record: &LogRecord);
}

impl<F> OutputAdapter for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn write(&self, record: &LogRecord) {
        self(record)
    }
}

/// Built-in adapters, selectable by name from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Json,
    Pretty,
}

impl OutputKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputKind::Json => "json",
            OutputKind::Pretty => "pretty",
        }
    }

    /// Instantiate the adapter writing to stdout
    pub fn adapter(self) -> Arc<dyn OutputAdapter> {
        match self {
            OutputKind::Json => Arc::new(JsonOutput::stdout()),
            OutputKind::Pretty => Arc::new(PrettyOutput::stdout()),
        }
    }
}

impl FromStr for OutputKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputKind::Json),
            "pretty" => Ok(OutputKind::Pretty),
            other => Err(ConfigError::InvalidOutput(other.to_string())),
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize to a JSON string without ever failing
///
/// A value serde cannot represent becomes `{"error": "..."}`.
pub fn stringify<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        serde_json::json!({ "error": format!("failed to serialize log: {}", err) }).to_string()
    })
}

/// Flatten a record into the JSON line layout
///
/// `level`, `time`, `namespace` and `contextId` come first, then the global
/// context fields spread at top level (overriding those four on collision),
/// then `message` and `data`, which always win.
pub fn json_line(record: &LogRecord) -> Map<String, Value> {
    let mut line = Map::new();
    line.insert("level".into(), Value::String(record.level.to_string()));
    line.insert("time".into(), Value::String(record.time_iso()));
    line.insert("namespace".into(), Value::String(record.namespace.clone()));
    line.insert("contextId".into(), Value::String(record.context_id.clone()));

    for (key, value) in &record.meta {
        if key == "message" || key == "data" {
            continue;
        }
        line.insert(key.clone(), value.clone());
    }

    if let Some(message) = &record.message {
        line.insert("message".into(), Value::String(message.clone()));
    }
    if let Some(data) = &record.data {
        line.insert("data".into(), data.clone());
    }
    line
}

/// One JSON object per line
pub struct JsonOutput<W: Write + Send = std::io::Stdout> {
    writer: Mutex<W>,
}

impl JsonOutput<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> OutputAdapter for JsonOutput<W> {
    fn write(&self, record: &LogRecord) {
        let mut line = stringify(&json_line(record));
        line.push('\n');

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }
}

/// Maximum nesting rendered by the pretty adapter
const PRETTY_MAX_DEPTH: usize = 6;
/// Indent step of the pretty dump
const PRETTY_INDENT: usize = 2;

/// Human-readable header line plus an indented dump of context, meta and data
pub struct PrettyOutput<W: Write + Send = std::io::Stdout> {
    writer: Mutex<W>,
}

impl PrettyOutput<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> PrettyOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> OutputAdapter for PrettyOutput<W> {
    fn write(&self, record: &LogRecord) {
        let text = pretty_text(record);

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.write_all(text.as_bytes());
        let _ = writer.flush();
    }
}

fn colorize(level: Severity, message: &str) -> ColoredString {
    match level {
        Severity::Error => message.red(),
        Severity::Warn => message.yellow(),
        Severity::Info => message.blue(),
        Severity::Debug => message.white(),
        Severity::Trace => message.bright_black(),
        Severity::None => message.red(),
    }
}

/// Render a record the way [`PrettyOutput`] writes it
pub fn pretty_text(record: &LogRecord) -> String {
    let time = record
        .time
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let message = colorize(record.level, record.message.as_deref().unwrap_or(""));

    let mut out = format!(
        "{} ({}) [{}] : {}\n",
        time, record.namespace, record.level, message
    );

    let mut details = Map::new();
    if !record.context_id.is_empty() {
        details.insert("contextId".into(), Value::String(record.context_id.clone()));
    }
    if !record.meta.is_empty() {
        details.insert("meta".into(), Value::Object(record.meta.clone()));
    }
    if let Some(data) = record.data.as_ref().filter(|d| !is_empty_value(d)) {
        details.insert("data".into(), data.clone());
    }

    render_map(&mut out, &details, PRETTY_INDENT, 0);
    out.push('\n');
    out
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Array(items) if items.is_empty() => "(empty array)".to_string(),
        Value::Object(map) if map.is_empty() => "(empty object)".to_string(),
        other => other.to_string(),
    }
}

fn is_nested(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

fn render_map(out: &mut String, map: &Map<String, Value>, indent: usize, depth: usize) {
    for (key, value) in map {
        let key = format!("{}:", key).green();
        if is_nested(value) {
            let _ = writeln!(out, "{:indent$}{}", "", key, indent = indent);
            render_nested(out, value, indent + PRETTY_INDENT, depth + 1);
        } else {
            let _ = writeln!(
                out,
                "{:indent$}{} {}",
                "",
                key,
                render_scalar(value),
                indent = indent
            );
        }
    }
}

fn render_nested(out: &mut String, value: &Value, indent: usize, depth: usize) {
    if depth >= PRETTY_MAX_DEPTH {
        let _ = writeln!(out, "{:indent$}(max depth reached)", "", indent = indent);
        return;
    }
    match value {
        Value::Object(map) => render_map(out, map, indent, depth),
        Value::Array(items) => {
            for item in items {
                if is_nested(item) {
                    let _ = writeln!(out, "{:indent$}-", "", indent = indent);
                    render_nested(out, item, indent + PRETTY_INDENT, depth + 1);
                } else {
                    let _ =
                        writeln!(out, "{:indent$}- {}", "", render_scalar(item), indent = indent);
                }
            }
        }
        scalar => {
            let _ = writeln!(out, "{:indent$}{}", "", render_scalar(scalar), indent = indent);
        }
    }
}
