//! Core value types shared by the facade and its engines.
//!
//! This module defines:
//! - Severity levels and their ordering
//! - Structured field values attached to records

use crate::{Error, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

// ============================================================================
// Severity
// ============================================================================

/// Record severity, ordered from least to most severe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            other => Err(Error::Config(format!("unknown log level: {}", other))),
        }
    }
}

// tracing has no level above ERROR, so fatal records share it
impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error | Level::Fatal => tracing::Level::ERROR,
        }
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        LevelFilter::from_level(level.into())
    }
}

// ============================================================================
// Structured fields
// ============================================================================

/// A typed field value
///
/// Encodes as a bare JSON string, number or boolean. Non-finite floats
/// have no JSON number form and are written as `"NaN"`, `"+Inf"` or `"-Inf"`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Uint(n) => serializer.serialize_u64(*n),
            Value::Float(n) if n.is_nan() => serializer.serialize_str("NaN"),
            Value::Float(n) if n.is_infinite() => {
                serializer.serialize_str(if *n > 0.0 { "+Inf" } else { "-Inf" })
            }
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Uint(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Uint(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A key/value pair attached to a record
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::Str(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, Value::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    /// Parse a `key=value` pair, inferring the value type
    ///
    /// Values are tried as bool, signed integer, unsigned integer and finite
    /// float before falling back to a string. Numbers written with a leading
    /// zero (`01234`) stay strings so the digits survive.
    pub fn parse(pair: &str) -> Result<Self> {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("expected key=value, got {:?}", pair)))?;

        if key.is_empty() {
            return Err(Error::Config(format!("empty field key in {:?}", pair)));
        }

        let value = if let Ok(b) = raw.parse::<bool>() {
            Value::Bool(b)
        } else if has_leading_zero(raw) {
            Value::Str(raw.to_owned())
        } else if let Ok(n) = raw.parse::<i64>() {
            Value::Int(n)
        } else if let Ok(n) = raw.parse::<u64>() {
            Value::Uint(n)
        } else if let Some(n) = raw.parse::<f64>().ok().filter(|n| n.is_finite()) {
            Value::Float(n)
        } else {
            Value::Str(raw.to_owned())
        };

        Ok(Self::new(key, value))
    }
}

/// `007`, `-01` and `00.5` but not `0`, `0.5` or `-0`
fn has_leading_zero(raw: &str) -> bool {
    let digits = raw.strip_prefix(|c| c == '-' || c == '+').unwrap_or(raw);
    let mut chars = digits.chars();
    chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit())
}
