use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Whether the watch covers a single file or a whole directory tree.
///
/// - `File`: the watched file is watched non-recursively and the exclusion
///   policy is bypassed for it, even once it has been removed or renamed.
/// - `DirectoryTree`: the root is watched recursively, directories are
///   announced once and missing paths go through the exclusion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    File,
    DirectoryTree,
}

/// The configured file or directory root being observed.
///
/// Built once at startup (see [`crate::config::validate_watch_path`]) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    path: PathBuf,
    mode: WatchMode,
}

impl WatchTarget {
    pub fn new(path: impl Into<PathBuf>, mode: WatchMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, WatchMode::File)
    }

    pub fn directory_tree(path: impl Into<PathBuf>) -> Self {
        Self::new(path, WatchMode::DirectoryTree)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    pub fn is_single_file(&self) -> bool {
        self.mode == WatchMode::File
    }

    pub fn is_recursive(&self) -> bool {
        self.mode == WatchMode::DirectoryTree
    }
}

/// MQTT quality of service used for every published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QosLevel {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl FromStr for QosLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "at_most_once" => Ok(QosLevel::AtMostOnce),
            "1" | "at_least_once" => Ok(QosLevel::AtLeastOnce),
            "2" | "exactly_once" => Ok(QosLevel::ExactlyOnce),
            other => Err(format!(
                "invalid qos: {other} (expected \"at_most_once\", \"at_least_once\" or \"exactly_once\")"
            )),
        }
    }
}

impl From<QosLevel> for rumqttc::QoS {
    fn from(q: QosLevel) -> Self {
        match q {
            QosLevel::AtMostOnce => rumqttc::QoS::AtMostOnce,
            QosLevel::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            QosLevel::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qos_parses_names_and_numbers() {
        assert_eq!("1".parse::<QosLevel>(), Ok(QosLevel::AtLeastOnce));
        assert_eq!(" Exactly_Once ".parse::<QosLevel>(), Ok(QosLevel::ExactlyOnce));
        assert!("three".parse::<QosLevel>().is_err());
    }

    #[test]
    fn target_mode_helpers() {
        let t = WatchTarget::file("/tmp/a.txt");
        assert!(t.is_single_file());
        assert!(!t.is_recursive());
        assert_eq!(t.path(), Path::new("/tmp/a.txt"));

        let d = WatchTarget::directory_tree("/srv/data");
        assert_eq!(d.mode(), WatchMode::DirectoryTree);
        assert!(d.is_recursive());
    }
}
