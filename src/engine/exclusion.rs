// src/engine/exclusion.rs

//! Exclusion policy for paths that no longer exist on disk.
//!
//! Plain entries match by string prefix on the absolute path, exactly as
//! written: `.git` also covers `.gitignore`. Entries containing glob
//! metacharacters are compiled with `globset` and match when the path or one
//! of its ancestors matches, so `/repo/.*` hides every hidden entry directly
//! under `/repo` together with everything beneath it.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::{MqttWatchError, Result};
use crate::watch::path_utils::{absolute, path_str};

/// Entries used when the configuration does not name any.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".*"];

#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    prefixes: Vec<String>,
    globs: Option<GlobSet>,
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '[', '{'])
}

impl ExclusionFilter {
    /// Build a filter from configured entries. Relative entries are made
    /// absolute against the current working directory.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes = Vec::new();
        let mut builder = GlobSetBuilder::new();
        let mut glob_count = 0usize;

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let abs = path_str(&absolute(Path::new(entry)));
            if is_glob(entry) {
                let glob = GlobBuilder::new(&abs)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| {
                        MqttWatchError::ConfigError(format!(
                            "invalid exclude pattern '{entry}': {e}"
                        ))
                    })?;
                builder.add(glob);
                glob_count += 1;
            } else {
                prefixes.push(abs);
            }
        }

        let globs = if glob_count == 0 {
            None
        } else {
            Some(builder.build().map_err(|e| {
                MqttWatchError::ConfigError(format!("building exclude globset: {e}"))
            })?)
        };

        Ok(Self { prefixes, globs })
    }

    /// A filter that excludes nothing.
    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
            globs: None,
        }
    }

    pub fn excluded(&self, path: &Path) -> bool {
        let abs = absolute(path);
        let abs_str = path_str(&abs);

        if self.prefixes.iter().any(|p| abs_str.starts_with(p.as_str())) {
            return true;
        }

        match &self.globs {
            Some(set) => abs.ancestors().any(|a| set.is_match(a)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_entries_match_by_string_prefix() {
        let f = ExclusionFilter::new(["/repo/.git"]).unwrap();
        assert!(f.excluded(Path::new("/repo/.git")));
        assert!(f.excluded(Path::new("/repo/.git/objects/ab")));
        assert!(f.excluded(Path::new("/repo/.gitignore")));
        assert!(!f.excluded(Path::new("/repo/src/main.rs")));
    }

    #[test]
    fn paths_are_normalized_before_matching() {
        let f = ExclusionFilter::new(["/repo/build"]).unwrap();
        assert!(f.excluded(Path::new("/repo/src/../build/out.o")));
    }

    #[test]
    fn glob_entries_cover_descendants() {
        let f = ExclusionFilter::new(["/repo/.*"]).unwrap();
        assert!(f.excluded(Path::new("/repo/.cache")));
        assert!(f.excluded(Path::new("/repo/.cache/x/y")));
        assert!(!f.excluded(Path::new("/repo/src/.hidden")));
        assert!(!f.excluded(Path::new("/repo/visible")));
    }

    #[test]
    fn relative_entries_resolve_against_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let f = ExclusionFilter::new([".git"]).unwrap();
        assert!(f.excluded(&cwd.join(".git/HEAD")));
        assert!(!f.excluded(Path::new("/definitely/elsewhere/.git")));
    }

    #[test]
    fn invalid_glob_is_config_error() {
        let err = ExclusionFilter::new(["/repo/[abc"]).unwrap_err();
        assert!(matches!(err, MqttWatchError::ConfigError(_)));
    }

    #[test]
    fn empty_filter_excludes_nothing() {
        assert!(!ExclusionFilter::none().excluded(Path::new("/anything")));
        let f = ExclusionFilter::new(Vec::<String>::new()).unwrap();
        assert!(!f.excluded(Path::new("/anything")));
    }
}
