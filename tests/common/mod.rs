#![allow(dead_code)]

pub use mqttwatch_test_utils::builders;
pub use mqttwatch_test_utils::{init_tracing, with_timeout, RecordingPublisher};

use std::sync::Arc;

use mqttwatch::engine::{ClassifierSettings, EventClassifier, ExclusionFilter};
use mqttwatch::fs::FileSystem;
use mqttwatch::types::WatchTarget;

/// Classifier over `fs` watching `root` as a directory tree, excluding
/// `excludes`.
pub fn tree_classifier(
    fs: Arc<dyn FileSystem>,
    root: &str,
    excludes: &[&str],
    settings: ClassifierSettings,
) -> EventClassifier {
    EventClassifier::new(
        fs,
        WatchTarget::directory_tree(root),
        ExclusionFilter::new(excludes.iter().copied()).expect("valid excludes"),
        settings,
    )
}
