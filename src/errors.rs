// src/errors.rs

//! Crate-wide error types.
//!
//! - [`MqttWatchError`] is the general error returned by fallible operations.
//! - [`ValidationError`] is raised before the watch loop starts and maps to a
//!   distinct process exit code per failure class.
//! - [`PublishError`] never leaves the publisher; it exists so failures have a
//!   typed shape when they are logged.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MqttWatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Broker error: {0}")]
    BrokerError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MqttWatchError {
    /// Exit code the binary should use when this error ends the process.
    pub fn exit_code(&self) -> i32 {
        match self {
            MqttWatchError::Validation(v) => v.exit_code(),
            MqttWatchError::ConfigError(_) | MqttWatchError::TomlError(_) => 5,
            _ => 1,
        }
    }
}

/// Startup validation failures for the `--path` argument.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Path {} does not exist. Please provide a valid path.", .0.display())]
    PathMissing(PathBuf),

    #[error(
        "No read permissions for path {}. Please provide appropriate permissions.",
        .0.display()
    )]
    PathUnreadable(PathBuf),
}

impl ValidationError {
    /// `2` is left to clap for usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidationError::PathMissing(_) => 3,
            ValidationError::PathUnreadable(_) => 4,
        }
    }
}

/// Failure to hand a message to the broker client.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to publish on topic '{topic}': {reason}")]
    Client { topic: String, reason: String },

    /// The send queue was full and this thread cannot wait for it.
    #[error("send queue full, dropped message on topic '{topic}'")]
    QueueFull { topic: String },
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MqttWatchError>;
