// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::QosLevel;

/// Command-line arguments for `mqttwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mqttwatch",
    version,
    about = "Folder Monitor with MQTT Integration: publish file changes on path-named topics.",
    long_about = None
)]
pub struct CliArgs {
    /// File or directory to monitor.
    #[arg(long, value_name = "PATH")]
    pub path: PathBuf,

    /// MQTT broker address.
    #[arg(long, value_name = "HOST")]
    pub address: String,

    /// MQTT broker port.
    #[arg(long, value_name = "PORT")]
    pub port: u16,

    /// Optional TOML config file with `[broker]` and `[watch]` sections.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Exclusion entry (prefix or glob). Repeatable; replaces the config list.
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Bytes per chunk when streaming large files.
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Files larger than this many bytes are streamed as chunks.
    #[arg(long, value_name = "BYTES")]
    pub large_file_threshold: Option<u64>,

    /// MQTT client identifier.
    #[arg(long, value_name = "ID")]
    pub client_id: Option<String>,

    /// Quality of service for published messages: 0, 1, 2 or
    /// at_most_once, at_least_once, exactly_once.
    #[arg(long, value_name = "QOS")]
    pub qos: Option<QosLevel>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MQTTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
