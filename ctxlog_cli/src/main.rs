use clap::{Parser, Subcommand, ValueEnum};
use ctxlog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ctxlog")]
#[command(about = "Structured logging with host-derived context", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Options file (defaults to the standard config path when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Application name recorded as app_name
    #[arg(long, global = true, env = "APP_NAME")]
    app_name: Option<String>,

    /// Deployment environment (required)
    #[arg(long = "env", global = true, env = "APP_ENV")]
    environment: Option<String>,

    /// Build revision recorded as version
    #[arg(long, global = true, env = "APP_REVISION")]
    revision: Option<String>,

    /// Override the host name
    #[arg(long, global = true, env = "APP_HOSTNAME")]
    hostname: Option<String>,

    /// Override the process id
    #[arg(long, global = true, env = "APP_PID")]
    pid: Option<u32>,

    /// Minimum level (debug, info, warn, error, fatal)
    #[arg(long = "level", global = true, env = "LOG_LEVEL")]
    min_level: Option<Level>,

    /// stderr, stdout or a file path
    #[arg(long, global = true, env = "LOG_OUTPUT")]
    output: Option<String>,

    /// Engine used to write records
    #[arg(long, global = true, value_enum, default_value_t = EngineArg::Json)]
    engine: EngineArg,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a single record
    Emit {
        /// Record level
        level: Level,

        /// Record message
        message: String,

        /// Extra fields as key=value
        #[arg(value_parser = parse_field)]
        fields: Vec<Field>,
    },

    /// Print the resolved options as JSON
    Resolve,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EngineArg {
    Json,
    Tracing,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Json => EngineKind::Json,
            EngineArg::Tracing => EngineKind::Tracing,
        }
    }
}

fn parse_field(s: &str) -> std::result::Result<Field, String> {
    Field::parse(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Records forwarded to tracing are filtered by the logger, not here
    match cli.engine {
        EngineArg::Json => ctxlog_core::logging::init_with_level("warn"),
        EngineArg::Tracing => ctxlog_core::logging::init_forwarding("warn"),
    }

    let options = load_options(&cli)?;

    match cli.command {
        Commands::Emit {
            level,
            message,
            fields,
        } => cmd_emit(options, cli.engine, level, &message, &fields),
        Commands::Resolve => cmd_resolve(options),
    }
}

/// Layer flags and environment variables over the options file
fn load_options(cli: &Cli) -> Result<Options> {
    let mut options = match &cli.config {
        Some(path) => Options::load_from(path)?,
        None => Options::load()?,
    };

    if let Some(app_name) = &cli.app_name {
        options.app_name = app_name.clone();
    }
    if let Some(environment) = &cli.environment {
        options.environment = environment.clone();
    }
    if let Some(revision) = &cli.revision {
        options.revision = revision.clone();
    }
    if let Some(hostname) = &cli.hostname {
        options.hostname = hostname.clone();
    }
    if let Some(pid) = cli.pid {
        options.process_id = pid;
    }
    if let Some(min_level) = cli.min_level {
        options.log_level = Some(min_level);
    }
    if let Some(output) = &cli.output {
        options.output = Output::from(output.clone());
    }

    Ok(options)
}

fn cmd_emit(
    options: Options,
    engine: EngineArg,
    level: Level,
    message: &str,
    fields: &[Field],
) -> Result<()> {
    let logger = ContextLogger::builder(options)
        .engine_kind(engine.into())
        .build()?;

    match level {
        Level::Debug => logger.debug(message, fields),
        Level::Info => logger.info(message, fields),
        Level::Warn => logger.warn(message, fields),
        Level::Error => logger.error(message, fields),
        Level::Fatal => logger.fatal(message, fields),
    }

    Ok(())
}

fn cmd_resolve(options: Options) -> Result<()> {
    let resolved = options.resolve(&SystemHost)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
