// src/config/mod.rs

//! Configuration loading and validation for mqttwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate settings and the watch path argument (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{BrokerSection, ConfigFile, RawConfigFile, WatchSection};
pub use validate::{validate_config, validate_watch_path, MAX_CHUNK_SIZE};
