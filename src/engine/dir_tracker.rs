// src/engine/dir_tracker.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Remembers which directories were already announced as opened.
///
/// The set only grows. It lives as long as the classifier that owns it,
/// which is one watch loop.
#[derive(Debug, Default)]
pub struct DirectoryOpenTracker {
    announced: HashSet<PathBuf>,
}

impl DirectoryOpenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `path` has not been announced yet. Callers that act on it
    /// must follow up with [`record_announced`](Self::record_announced).
    pub fn should_announce_open(&self, path: &Path) -> bool {
        !self.announced.contains(path)
    }

    pub fn record_announced(&mut self, path: &Path) {
        self.announced.insert(path.to_path_buf());
    }

    /// Check and record in one step; true only the first time.
    pub fn announce_once(&mut self, path: &Path) -> bool {
        if self.should_announce_open(path) {
            self.record_announced(path);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.announced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.announced.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn announces_each_directory_once() {
        let mut t = DirectoryOpenTracker::new();
        assert!(t.announce_once(Path::new("/a")));
        assert!(!t.announce_once(Path::new("/a")));
        assert!(t.announce_once(Path::new("/b")));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn should_announce_does_not_record() {
        let mut t = DirectoryOpenTracker::new();
        assert!(t.should_announce_open(Path::new("/a")));
        assert!(t.should_announce_open(Path::new("/a")));
        t.record_announced(Path::new("/a"));
        assert!(!t.should_announce_open(Path::new("/a")));
    }

    proptest! {
        #[test]
        fn first_call_per_path_is_the_only_true(seq in proptest::collection::vec(0u8..8, 0..64)) {
            let mut t = DirectoryOpenTracker::new();
            let mut seen = HashSet::new();
            for id in seq {
                let p = PathBuf::from(format!("/d/{id}"));
                prop_assert_eq!(t.announce_once(&p), seen.insert(id));
            }
        }
    }
}
