#![allow(dead_code)]

use std::path::{Path, PathBuf};

use mqttwatch::config::{ConfigFile, RawConfigFile};
use mqttwatch::engine::{EventFlags, RawNotification};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn client_id(mut self, id: &str) -> Self {
        self.config.broker.client_id = id.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config
            .watch
            .exclude
            .get_or_insert_with(Vec::new)
            .push(pattern.to_string());
        self
    }

    pub fn no_excludes(mut self) -> Self {
        self.config.watch.exclude = Some(vec![]);
        self
    }

    pub fn large_file_threshold(mut self, bytes: u64) -> Self {
        self.config.watch.large_file_threshold = bytes;
        self
    }

    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.config.watch.chunk_size = bytes;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawNotification`, addressed by the full entry path.
pub struct NotificationBuilder {
    entry: PathBuf,
    flags: EventFlags,
}

impl NotificationBuilder {
    pub fn new(entry: impl AsRef<Path>) -> Self {
        Self {
            entry: entry.as_ref().to_path_buf(),
            flags: EventFlags::empty(),
        }
    }

    pub fn created(mut self) -> Self {
        self.flags |= EventFlags::CREATED;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.flags |= EventFlags::DELETED;
        self
    }

    pub fn opened(mut self) -> Self {
        self.flags |= EventFlags::OPENED;
        self
    }

    pub fn accessed(mut self) -> Self {
        self.flags |= EventFlags::ACCESSED;
        self
    }

    pub fn closed_after_write(mut self) -> Self {
        self.flags |= EventFlags::CLOSED_AFTER_WRITE;
        self
    }

    pub fn closed_without_write(mut self) -> Self {
        self.flags |= EventFlags::CLOSED_WITHOUT_WRITE;
        self
    }

    pub fn moved_from(mut self) -> Self {
        self.flags |= EventFlags::MOVED_FROM;
        self
    }

    pub fn moved_to(mut self) -> Self {
        self.flags |= EventFlags::MOVED_TO;
        self
    }

    pub fn directory(mut self) -> Self {
        self.flags |= EventFlags::IS_DIRECTORY;
        self
    }

    pub fn flags(mut self, flags: EventFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn build(self) -> RawNotification {
        RawNotification::for_entry(&self.entry, self.flags)
    }
}
