use std::{
    fs,
    io::IsTerminal,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use clap::{ArgGroup, Parser, ValueEnum};
use serde_json::Value;
use tracing::Subscriber;
use tracing_subscriber::{registry::LookupSpan, Layer};

use crate::config::Config;

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    /// Also enables logs of every dependency
    Trace,
}

impl LogLevel {
    /// Only the granate crates log below `trace`.
    pub(crate) fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "granate=error,off",
            LogLevel::Warn => "granate=warn,off",
            LogLevel::Info => "granate=info,granate_cli=info,off",
            LogLevel::Debug => "granate=debug,granate_cli=debug,runtime_local=debug,off",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogStyle {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[clap(group(ArgGroup::new("operation").required(true).args(["query", "query_file"])))]
#[command(name = "granate", version)]
#[command(arg_required_else_help = true)]
/// Runs a GraphQL query against an annotated schema and prints the response
pub(crate) struct Args {
    /// Path to the annotated GraphQL SDL
    #[arg(long, short, env = "GRANATE_SCHEMA_PATH")]
    pub schema: PathBuf,
    /// The GraphQL operation to run
    #[arg(long, short)]
    pub query: Option<String>,
    /// Path to a file containing the GraphQL operation to run
    #[arg(long)]
    pub query_file: Option<PathBuf>,
    /// Variables of the operation, as a JSON object
    #[arg(long)]
    pub variables: Option<String>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "GRANATE_CONFIG_PATH", default_value = "./granate.toml")]
    pub config: PathBuf,
    /// Set the logging level
    #[arg(long = "log", env = "GRANATE_LOG")]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "GRANATE_LOG_STYLE", value_enum, default_value_t = LogStyle::Text)]
    pub log_style: LogStyle,
}

impl Args {
    /// A missing configuration file at the default location is not an error.
    pub fn config(&self) -> anyhow::Result<Config> {
        if !self.config.exists() && self.config == Path::new("./granate.toml") {
            return Ok(Config::default());
        }

        let config = fs::read_to_string(&self.config)
            .with_context(|| format!("error loading config from {}", self.config.display()))?;

        toml::from_str(&config).map_err(|error| anyhow!("error parsing config:\n{error}"))
    }

    pub fn schema(&self) -> anyhow::Result<String> {
        fs::read_to_string(&self.schema).map_err(|error| anyhow!("error loading schema:\n{error}"))
    }

    pub fn query(&self) -> anyhow::Result<String> {
        match (&self.query, &self.query_file) {
            (Some(query), _) => Ok(query.clone()),
            (None, Some(path)) => fs::read_to_string(path).map_err(|error| anyhow!("error loading query:\n{error}")),
            (None, None) => Err(anyhow!("either --query or --query-file must be given")),
        }
    }

    pub fn variables(&self) -> anyhow::Result<Option<Value>> {
        let Some(variables) = &self.variables else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(variables).context("error parsing variables")? {
            variables @ Value::Object(_) => Ok(Some(variables)),
            _ => Err(anyhow!("variables must be a JSON object")),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// Logs go to stderr, stdout carries the response.
    pub fn log_format<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        match self.log_style {
            LogStyle::Text if std::io::stderr().is_terminal() => layer.with_ansi(true).boxed(),
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}

pub(crate) fn parse() -> Args {
    Args::parse()
}
