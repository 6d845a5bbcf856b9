#![forbid(unsafe_code)]

//! Structured logging facade with host-derived context.
//!
//! This crate provides:
//! - Logger options and their environment-driven defaults
//! - Host environment queries (hostname, process id)
//! - JSON and `tracing` engines
//! - The [`ContextLogger`] facade with five leveled operations

pub mod types;
pub mod error;
pub mod config;
pub mod host;
pub mod engine;
pub mod reporter;
pub mod logger;
pub mod logging;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::{Field, Level, Value};
pub use config::{Options, Output, ResolvedOptions};
pub use host::{HostEnv, SystemHost};
pub use engine::{Engine, JsonEngine, Record, TracingEngine};
pub use reporter::Reporter;
pub use logger::{ContextLogger, EngineKind, Logger, LoggerBuilder, ProcessExit, Terminator};
