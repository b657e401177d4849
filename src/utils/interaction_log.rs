//! Append-only JSON-lines log of tool calls.
//!
//! Each line is one [`InteractionEntry`]. Write failures are reported through
//! `tracing` and never propagate to the tool caller.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Default log file name, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "mcp_interactions.log.json";

/// A single logged tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEntry {
    /// UTC timestamp, RFC 3339 with a `Z` suffix
    pub timestamp: String,
    pub tool_name: String,
    /// Arguments, each rendered as a string
    pub inputs: Map<String, Value>,
    pub output: Value,
    pub error: Option<String>,
}

impl InteractionEntry {
    /// Build an entry stamped with the current time
    pub fn new(tool_name: &str, args: &Value, output: Value, error: Option<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            tool_name: tool_name.to_string(),
            inputs: stringify_inputs(args),
            output,
            error,
        }
    }
}

/// Render every argument value as a JSON string
fn stringify_inputs(args: &Value) -> Map<String, Value> {
    match args {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), Value::String(rendered))
            })
            .collect(),
        _ => Map::new(),
    }
}

/// Writer for the interaction log
#[derive(Debug, Clone)]
pub struct InteractionLog {
    path: PathBuf,
}

impl InteractionLog {
    /// Log to the given file; parent directories are created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append an entry, creating the file if needed
    pub fn append(&self, entry: &InteractionEntry) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // One write per entry so concurrent appends never split a line
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())
    }

    /// Record a tool call, falling back to a tracing warning if the write fails
    pub fn record(&self, tool_name: &str, args: &Value, output: Value, error: Option<String>) {
        let entry = InteractionEntry::new(tool_name, args, output, error);
        if let Err(e) = self.append(&entry) {
            tracing::warn!(
                "Error writing to interaction log {}: {}",
                self.path.display(),
                e
            );
            tracing::warn!(
                "Fallback log: {}",
                serde_json::to_string(&entry).unwrap_or_default()
            );
        }
    }

    /// Read back all parseable entries, oldest first
    pub fn read_entries(&self) -> io::Result<Vec<InteractionEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if let Ok(entry) = serde_json::from_str(&line) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
