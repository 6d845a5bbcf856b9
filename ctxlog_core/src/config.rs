//! Logger options and their defaulting rules.
//!
//! Options can be built in code or loaded from
//! `$XDG_CONFIG_HOME/ctxlog/config.toml`. Unset values are filled in by
//! [`Options::resolve`] before any engine is constructed.

use crate::host::HostEnv;
use crate::{Error, Field, Level, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environments that log at info by default instead of debug
pub const QUIET_ENVIRONMENTS: [&str; 2] = ["staging", "production"];

/// Where the JSON engine writes records
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Output {
    #[default]
    Stderr,
    Stdout,
    File(PathBuf),
}

impl From<String> for Output {
    fn from(s: String) -> Self {
        match s.as_str() {
            "stderr" => Output::Stderr,
            "stdout" => Output::Stdout,
            _ => Output::File(PathBuf::from(s)),
        }
    }
}

impl From<Output> for String {
    fn from(output: Output) -> Self {
        output.to_string()
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stderr => f.write_str("stderr"),
            Output::Stdout => f.write_str("stdout"),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Caller-supplied logger options
///
/// Empty `hostname`, zero `process_id` and a missing `log_level` mean
/// "derive at construction time".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub app_name: String,
    pub environment: String,
    pub revision: String,
    pub hostname: String,
    pub process_id: u32,
    pub log_level: Option<Level>,
    pub output: Output,
}

/// Options with every default applied
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedOptions {
    pub app_name: String,
    pub environment: String,
    pub revision: String,
    pub hostname: String,
    pub process_id: u32,
    pub log_level: Level,
    pub output: Output,
}

impl Options {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..Self::default()
        }
    }

    /// Load options from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load options from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options: Options = toml::from_str(&contents)?;
        tracing::debug!("Loaded logger options from {:?}", path);
        Ok(options)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        base.join("ctxlog").join("config.toml")
    }

    /// Apply defaults, querying `host` for anything left unset
    ///
    /// The environment check runs before any defaulting, so an empty
    /// environment never touches the host.
    pub fn resolve(self, host: &dyn HostEnv) -> Result<ResolvedOptions> {
        if self.environment.is_empty() {
            return Err(Error::Config("environment must be set".into()));
        }

        let log_level = self
            .log_level
            .unwrap_or_else(|| default_level(&self.environment));

        let hostname = if self.hostname.is_empty() {
            let name = host.hostname().map_err(Error::HostResolution)?;
            tracing::debug!("Resolved hostname {:?} from host", name);
            name
        } else {
            self.hostname
        };

        let process_id = if self.process_id == 0 {
            host.process_id()
        } else {
            self.process_id
        };

        Ok(ResolvedOptions {
            app_name: self.app_name,
            environment: self.environment,
            revision: self.revision,
            hostname,
            process_id,
            log_level,
            output: self.output,
        })
    }
}

/// Minimum level used when the caller did not pick one
pub fn default_level(environment: &str) -> Level {
    if QUIET_ENVIRONMENTS.contains(&environment) {
        Level::Info
    } else {
        Level::Debug
    }
}

impl ResolvedOptions {
    /// Fields bound to every record, in emission order
    pub fn context_fields(&self) -> Vec<Field> {
        vec![
            Field::string("app_name", self.app_name.as_str()),
            Field::string("hostname", self.hostname.as_str()),
            Field::string("version", self.revision.as_str()),
            Field::string("env", self.environment.as_str()),
            Field::uint("PID", self.process_id.into()),
        ]
    }
}
