// src/fs/mod.rs

//! Filesystem access used by the classifier and startup validation.
//!
//! Everything that touches the disk goes through [`FileSystem`] so the core
//! can be driven by [`mock::MockFileSystem`] in tests.

use std::fmt::Debug;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};

pub mod mock;

/// What currently lives at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with its size in bytes.
    File { len: u64 },
    Dir,
    /// Sockets, fifos, device nodes. Treated like directories by the
    /// classifier since they are neither streamed nor mapped.
    Other,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Kind of the entry at `path`, or `None` if nothing exists there.
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Succeeds if the current process can read `path` (open a file, list a
    /// directory).
    fn check_readable(&self, path: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool {
        self.entry_kind(path).is_some()
    }
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        // Follows symlinks, so a dangling link counts as missing.
        let meta = fs::metadata(path).ok()?;
        let kind = if meta.is_file() {
            EntryKind::File { len: meta.len() }
        } else if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        };
        Some(kind)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(file))
    }

    fn check_readable(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            fs::read_dir(path).with_context(|| format!("listing dir {:?}", path))?;
        } else {
            fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        }
        Ok(())
    }
}
