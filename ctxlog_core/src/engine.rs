//! Structured logging engines.
//!
//! An [`Engine`] is built once with the context fields bound and the
//! minimum level fixed. The facade hands it one [`Record`] per call.
//!
//! Two engines are provided:
//! - [`JsonEngine`]: one compact JSON object per line, for machine consumption
//! - [`TracingEngine`]: forwards records to the current `tracing` dispatcher

use crate::config::Output;
use crate::{Field, Level};
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

/// Target used for records forwarded to `tracing`
pub const RECORD_TARGET: &str = "ctxlog::record";

/// A single log call, before context is attached
#[derive(Debug)]
pub struct Record<'a> {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub caller: &'static Location<'static>,
    pub message: &'a str,
    pub fields: &'a [Field],
}

/// Backend that encodes and writes records
pub trait Engine: Send + Sync {
    /// Whether records at `level` pass the configured minimum
    fn enabled(&self, level: Level) -> bool;

    /// Write a record. Failures are absorbed by the engine.
    fn emit(&self, record: &Record<'_>);
}

// ============================================================================
// JSON engine
// ============================================================================

/// Records at or above this level carry a `stacktrace` key
pub const STACKTRACE_LEVEL: Level = Level::Error;

/// Production-mode engine writing JSON lines
pub struct JsonEngine {
    level: Level,
    context: Vec<Field>,
    make_writer: BoxMakeWriter,
}

impl JsonEngine {
    pub fn new(level: Level, context: Vec<Field>, make_writer: BoxMakeWriter) -> Self {
        Self {
            level,
            context,
            make_writer,
        }
    }

    /// Build an engine writing to `output`
    ///
    /// File outputs are opened in append mode, creating the file if needed.
    pub fn from_output(level: Level, context: Vec<Field>, output: &Output) -> io::Result<Self> {
        let make_writer = match output {
            Output::Stderr => BoxMakeWriter::new(io::stderr),
            Output::Stdout => BoxMakeWriter::new(io::stdout),
            Output::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        };
        Ok(Self::new(level, context, make_writer))
    }

    fn encode(&self, record: &Record<'_>) -> serde_json::Result<Vec<u8>> {
        let stacktrace = (record.level >= STACKTRACE_LEVEL)
            .then(|| Backtrace::force_capture().to_string());
        let mut line = serde_json::to_vec(&JsonLine {
            context: &self.context,
            record,
            stacktrace: stacktrace.as_deref(),
        })?;
        line.push(b'\n');
        Ok(line)
    }
}

impl std::fmt::Debug for JsonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonEngine")
            .field("level", &self.level)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Engine for JsonEngine {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn emit(&self, record: &Record<'_>) {
        let line = match self.encode(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to encode log record: {}", e);
                return;
            }
        };

        // One write per record keeps concurrent lines intact
        let mut writer = self.make_writer.make_writer();
        if let Err(e) = writer.write_all(&line).and_then(|()| writer.flush()) {
            tracing::warn!("Failed to write log record: {}", e);
        }
    }
}

/// Wire shape: level, ts, caller, msg, stacktrace (error and fatal only),
/// context fields, caller fields
struct JsonLine<'a> {
    context: &'a [Field],
    record: &'a Record<'a>,
    stacktrace: Option<&'a str>,
}

impl Serialize for JsonLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.record;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("level", record.level.as_str())?;
        map.serialize_entry("ts", &epoch_seconds(&record.time))?;
        map.serialize_entry("caller", &caller_string(record.caller))?;
        map.serialize_entry("msg", record.message)?;
        if let Some(stacktrace) = self.stacktrace {
            map.serialize_entry("stacktrace", stacktrace)?;
        }
        for field in self.context.iter().chain(record.fields) {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

fn epoch_seconds(time: &DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000.0
}

fn caller_string(caller: &Location<'_>) -> String {
    format!("{}:{}", caller.file(), caller.line())
}

// ============================================================================
// tracing engine
// ============================================================================

/// Engine that re-emits records as `tracing` events
///
/// Context and caller fields are rendered as JSON strings because `tracing`
/// field names must be known at compile time.
#[derive(Debug)]
pub struct TracingEngine {
    level: Level,
    context: String,
}

impl TracingEngine {
    pub fn new(level: Level, context: Vec<Field>) -> Self {
        Self {
            level,
            context: render_fields(&context),
        }
    }
}

impl Engine for TracingEngine {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn emit(&self, record: &Record<'_>) {
        let caller = caller_string(record.caller);
        let fields = render_fields(record.fields);
        let context = self.context.as_str();
        let message = record.message;

        match record.level {
            Level::Debug => {
                tracing::debug!(target: RECORD_TARGET, %caller, %context, %fields, "{}", message)
            }
            Level::Info => {
                tracing::info!(target: RECORD_TARGET, %caller, %context, %fields, "{}", message)
            }
            Level::Warn => {
                tracing::warn!(target: RECORD_TARGET, %caller, %context, %fields, "{}", message)
            }
            Level::Error => {
                tracing::error!(target: RECORD_TARGET, %caller, %context, %fields, "{}", message)
            }
            Level::Fatal => tracing::error!(
                target: RECORD_TARGET,
                fatal = true,
                %caller,
                %context,
                %fields,
                "{}",
                message
            ),
        }
    }
}

struct FieldMap<'a>(&'a [Field]);

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

fn render_fields(fields: &[Field]) -> String {
    // Field values are strings, numbers and bools, which always encode
    serde_json::to_string(&FieldMap(fields)).unwrap_or_default()
}
