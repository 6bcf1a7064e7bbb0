//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (watch, validate), and their associated argument structs.
//! Every `watch` flag has an environment variable equivalent for container
//! deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "hotcfg",
    version,
    about = "Hot-reloadable configuration manager",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        hotcfg watch                         Watch ./config.toml (created if missing)\n  \
        hotcfg watch -c app.yaml             Watch a specific file\n  \
        hotcfg validate app.json             Check a file without watching it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a config file and log every hot reload until interrupted
    Watch(WatchArgs),

    /// Decode a config file and report whether it is valid
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        hotcfg watch                                   Watch ./config.toml\n  \
        hotcfg watch -c app.toml --defaults base.toml  Seed a missing file from base.toml\n  \
        hotcfg watch --debounce-ms 250 --pretty        Slower editors, local dev")]
pub struct WatchArgs {
    /// Config file path (.toml, .json, .yaml)
    #[arg(short, long, env = "HOTCFG_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// File whose content seeds a missing config file and serves as the fallback
    #[arg(short, long, env = "HOTCFG_DEFAULTS")]
    pub defaults: Option<PathBuf>,

    /// Quiet period collapsing bursts of writes into one reload
    #[arg(long, env = "HOTCFG_DEBOUNCE_MS", default_value_t = 100)]
    pub debounce_ms: u64,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "config.toml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
