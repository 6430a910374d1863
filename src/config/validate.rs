// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::engine::exclusion::ExclusionFilter;
use crate::errors::{MqttWatchError, Result, ValidationError};
use crate::fs::{EntryKind, FileSystem};
use crate::types::WatchTarget;
use crate::watch::path_utils::absolute;

/// Largest chunk that still fits an MQTT packet together with its topic.
pub const MAX_CHUNK_SIZE: usize = 256 * 1024 * 1024 - 64 * 1024;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::MqttWatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.broker, raw.watch))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_broker(cfg)?;
    validate_sizes(cfg)?;
    validate_excludes(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> MqttWatchError {
    MqttWatchError::ConfigError(msg.into())
}

fn validate_broker(cfg: &RawConfigFile) -> Result<()> {
    let b = &cfg.broker;
    if b.client_id.trim().is_empty() {
        return Err(config_error("[broker].client_id must not be empty"));
    }
    if b.queue_capacity == 0 {
        return Err(config_error("[broker].queue_capacity must be >= 1 (got 0)"));
    }
    if b.retry_delay_secs == 0 {
        return Err(config_error("[broker].retry_delay_secs must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_sizes(cfg: &RawConfigFile) -> Result<()> {
    let w = &cfg.watch;
    if w.chunk_size == 0 {
        return Err(config_error("[watch].chunk_size must be >= 1 (got 0)"));
    }
    if w.chunk_size > MAX_CHUNK_SIZE {
        return Err(config_error(format!(
            "[watch].chunk_size must be <= {MAX_CHUNK_SIZE} (got {})",
            w.chunk_size
        )));
    }
    if w.large_file_threshold == 0 {
        return Err(config_error(
            "[watch].large_file_threshold must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

fn validate_excludes(cfg: &RawConfigFile) -> Result<()> {
    ExclusionFilter::new(cfg.watch.excludes()).map(|_| ())
}

/// Check the `--path` argument and turn it into a [`WatchTarget`].
///
/// Runs before anything else starts; failures end the process.
pub fn validate_watch_path(
    fs: &dyn FileSystem,
    path: &Path,
) -> std::result::Result<WatchTarget, ValidationError> {
    let abs = absolute(path);
    let kind = fs
        .entry_kind(&abs)
        .ok_or_else(|| ValidationError::PathMissing(path.to_path_buf()))?;

    if fs.check_readable(&abs).is_err() {
        return Err(ValidationError::PathUnreadable(path.to_path_buf()));
    }

    // Lexical only: topics and excludes stay under the path as given, even
    // when it is a symlink.
    Ok(match kind {
        EntryKind::File { .. } => WatchTarget::file(abs),
        EntryKind::Dir | EntryKind::Other => WatchTarget::directory_tree(abs),
    })
}
