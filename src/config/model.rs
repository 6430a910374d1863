// src/config/model.rs

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::classifier::{
    ClassifierSettings, DEFAULT_CHUNK_SIZE, DEFAULT_LARGE_FILE_THRESHOLD,
};
use crate::engine::exclusion::DEFAULT_EXCLUDES;
use crate::types::QosLevel;

/// Raw configuration as read from a TOML file, before validation.
///
/// ```toml
/// [broker]
/// client_id = "mqttwatch"
/// qos = "at_most_once"
/// keep_alive_secs = 30
/// retry_delay_secs = 5
/// queue_capacity = 1024
///
/// [watch]
/// exclude = [".git", ".*"]
/// large_file_threshold = 104857600
/// chunk_size = 262144
/// ```
///
/// All sections are optional and have reasonable defaults. The broker
/// address and port always come from the command line.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub broker: BrokerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)`; see `config::validate`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub broker: BrokerSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(broker: BrokerSection, watch: WatchSection) -> Self {
        Self { broker, watch }
    }

    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            large_file_threshold: self.watch.large_file_threshold,
            chunk_size: NonZeroUsize::new(self.watch.chunk_size).unwrap_or(DEFAULT_CHUNK_SIZE),
        }
    }
}

/// `[broker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSection {
    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default)]
    pub qos: QosLevel,

    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Pause between refused connection attempts.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Messages the client buffers before publishes start being dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl BrokerSection {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

fn default_client_id() -> String {
    "mqttwatch".to_string()
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            qos: QosLevel::default(),
            keep_alive_secs: default_keep_alive_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Exclusion entries; `None` means [`DEFAULT_EXCLUDES`].
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// Files strictly larger than this many bytes are sent as chunks.
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: u64,

    /// Bytes per chunk message.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl WatchSection {
    /// Effective exclusion entries.
    pub fn excludes(&self) -> Vec<String> {
        match &self.exclude {
            Some(list) => list.clone(),
            None => DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn default_large_file_threshold() -> u64 {
    DEFAULT_LARGE_FILE_THRESHOLD
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE.get()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            exclude: None,
            large_file_threshold: default_large_file_threshold(),
            chunk_size: default_chunk_size(),
        }
    }
}
