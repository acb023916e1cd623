//! Log formatting options for different output styles

use crate::logging::LogEntry;
use serde_json::Value;
use std::str::FromStr;

/// How log lines are rendered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// {"timestamp":"2026-01-15T10:30:00Z","level":"INFO","target":"...","message":"..."}
    Json,
    /// 2026-01-15 10:30:00.000 INFO  [shopguard_core::store] Loaded permissions ...
    Human,
    /// timestamp=... level=INFO target=... message="..."
    Logfmt,
}

impl LogFormat {
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Json => format_json(entry),
            LogFormat::Human => format_human(entry),
            LogFormat::Logfmt => format_logfmt(entry),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "human" | "text" => Ok(LogFormat::Human),
            "logfmt" => Ok(LogFormat::Logfmt),
            _ => Err("expected json, human or logfmt".to_string()),
        }
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

fn format_json(entry: &LogEntry) -> String {
    let mut json = serde_json::Map::new();

    json.insert("timestamp".to_string(), Value::String(entry.timestamp.to_rfc3339()));
    json.insert("level".to_string(), Value::String(entry.level_name()));
    json.insert("target".to_string(), Value::String(entry.target.clone()));
    json.insert("message".to_string(), Value::String(entry.message.clone()));

    for (key, value) in &entry.fields {
        json.insert(key.clone(), value.clone());
    }

    Value::Object(json).to_string()
}

fn format_human(entry: &LogEntry) -> String {
    let mut line = format!(
        "{} {:5} [{}] {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        entry.level_name(),
        entry.target,
        entry.message
    );

    for (key, value) in &entry.fields {
        line.push_str(&format!(" {}={}", key, plain(value)));
    }

    line
}

fn format_logfmt(entry: &LogEntry) -> String {
    let mut parts = vec![
        format!("timestamp={}", entry.timestamp.to_rfc3339()),
        format!("level={}", entry.level_name()),
        format!("target={}", entry.target),
        format!("message={}", quoted(&entry.message)),
    ];

    for (key, value) in &entry.fields {
        let rendered = match value {
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            other => quoted(&plain(other)),
        };
        parts.push(format!("{}={}", key, rendered));
    }

    parts.join(" ")
}
