//! The logging facade.
//!
//! [`ContextLogger`] resolves [`Options`], binds the context fields
//! (`app_name`, `hostname`, `version`, `env`, `PID`) into an [`Engine`] once,
//! and then exposes five leveled operations. It is immutable after
//! construction and can be shared across threads behind an `Arc`.

use crate::engine::{Engine, JsonEngine, Record, TracingEngine};
use crate::host::{HostEnv, SystemHost};
use crate::reporter::Reporter;
use crate::{Error, Field, Level, Options, Output, ResolvedOptions, Result};
use chrono::Utc;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

/// Exit status used after a fatal record
pub const FATAL_EXIT_CODE: i32 = 1;

/// Leveled logging operations
///
/// None of the operations report failure. Records below the configured
/// level are dropped silently.
pub trait Logger {
    fn debug(&self, message: &str, fields: &[Field]);
    fn info(&self, message: &str, fields: &[Field]);
    fn warn(&self, message: &str, fields: &[Field]);
    fn error(&self, message: &str, fields: &[Field]);

    /// Log the record, then end the process
    fn fatal(&self, message: &str, fields: &[Field]) -> !;
}

/// Ends the process after a fatal record
pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32) -> !;
}

/// Terminator that exits the current process
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}

/// Which engine the builder constructs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineKind {
    #[default]
    Json,
    /// Records go wherever the installed `tracing` subscriber writes.
    /// Building fails if a writer or a non-default output is also set.
    Tracing,
}

// ============================================================================
// Construction
// ============================================================================

/// Builder for [`ContextLogger`] with injectable collaborators
pub struct LoggerBuilder {
    options: Options,
    host: Box<dyn HostEnv>,
    writer: Option<BoxMakeWriter>,
    engine_kind: EngineKind,
    reporter: Option<Arc<dyn Reporter>>,
    terminator: Arc<dyn Terminator>,
}

impl LoggerBuilder {
    fn new(options: Options) -> Self {
        Self {
            options,
            host: Box::new(SystemHost),
            writer: None,
            engine_kind: EngineKind::default(),
            reporter: None,
            terminator: Arc::new(ProcessExit),
        }
    }

    /// Source of hostname and process id for unset options
    pub fn host(mut self, host: impl HostEnv + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Write JSON records here instead of the configured output
    pub fn writer<M>(mut self, make_writer: M) -> Self
    where
        M: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        self.writer = Some(BoxMakeWriter::new(make_writer));
        self
    }

    pub fn engine_kind(mut self, kind: EngineKind) -> Self {
        self.engine_kind = kind;
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn terminator(mut self, terminator: impl Terminator + 'static) -> Self {
        self.terminator = Arc::new(terminator);
        self
    }

    /// Resolve options and construct the engine
    ///
    /// # Errors
    /// - [`Error::Config`] if the environment is empty
    /// - [`Error::HostResolution`] if the hostname cannot be read
    /// - [`Error::Config`] if the tracing engine is combined with a writer
    ///   or an output other than stderr
    /// - [`Error::EngineInit`] if the output cannot be opened
    pub fn build(self) -> Result<ContextLogger> {
        let options = self.options.resolve(self.host.as_ref())?;
        let context = options.context_fields();
        let level = options.log_level;

        let engine: Arc<dyn Engine> = match (self.engine_kind, self.writer) {
            (EngineKind::Tracing, Some(_)) => {
                return Err(Error::Config(
                    "a custom writer requires the json engine".into(),
                ))
            }
            (EngineKind::Tracing, None) if options.output != Output::Stderr => {
                return Err(Error::Config(format!(
                    "output {} requires the json engine",
                    options.output
                )))
            }
            (EngineKind::Tracing, None) => Arc::new(TracingEngine::new(level, context)),
            (EngineKind::Json, Some(writer)) => Arc::new(JsonEngine::new(level, context, writer)),
            (EngineKind::Json, None) => Arc::new(
                JsonEngine::from_output(level, context, &options.output)
                    .map_err(Error::EngineInit)?,
            ),
        };

        tracing::debug!(
            "Logger ready for {:?} at level {} (host {}, pid {})",
            options.environment,
            level,
            options.hostname,
            options.process_id
        );

        Ok(ContextLogger {
            options,
            engine,
            reporter: self.reporter,
            terminator: self.terminator,
        })
    }
}

// ============================================================================
// Facade
// ============================================================================

/// Structured logger carrying fixed context fields
pub struct ContextLogger {
    options: ResolvedOptions,
    engine: Arc<dyn Engine>,
    reporter: Option<Arc<dyn Reporter>>,
    terminator: Arc<dyn Terminator>,
}

impl ContextLogger {
    /// Build a JSON logger using the real host environment
    pub fn new(options: Options) -> Result<Self> {
        Self::builder(options).build()
    }

    pub fn builder(options: Options) -> LoggerBuilder {
        LoggerBuilder::new(options)
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn level(&self) -> Level {
        self.options.log_level
    }

    pub fn reporter(&self) -> Option<&Arc<dyn Reporter>> {
        self.reporter.as_ref()
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.engine.enabled(level)
    }

    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.log(Level::Debug, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        self.log(Level::Info, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.log(Level::Warn, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field]) {
        self.log(Level::Error, message, fields, Location::caller());
    }

    /// Log at fatal level and terminate with [`FATAL_EXIT_CODE`]
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Field]) -> ! {
        self.log(Level::Fatal, message, fields, Location::caller());
        self.terminator.terminate(FATAL_EXIT_CODE)
    }

    fn log(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        if !self.engine.enabled(level) {
            return;
        }
        self.engine.emit(&Record {
            level,
            time: Utc::now(),
            caller,
            message,
            fields,
        });
    }
}

impl fmt::Debug for ContextLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextLogger")
            .field("options", &self.options)
            .field("reporter", &self.reporter.is_some())
            .finish_non_exhaustive()
    }
}

impl Logger for ContextLogger {
    #[track_caller]
    fn debug(&self, message: &str, fields: &[Field]) {
        ContextLogger::debug(self, message, fields)
    }

    #[track_caller]
    fn info(&self, message: &str, fields: &[Field]) {
        ContextLogger::info(self, message, fields)
    }

    #[track_caller]
    fn warn(&self, message: &str, fields: &[Field]) {
        ContextLogger::warn(self, message, fields)
    }

    #[track_caller]
    fn error(&self, message: &str, fields: &[Field]) {
        ContextLogger::error(self, message, fields)
    }

    #[track_caller]
    fn fatal(&self, message: &str, fields: &[Field]) -> ! {
        ContextLogger::fatal(self, message, fields)
    }
}
