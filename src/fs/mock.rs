// src/fs/mock.rs

use super::{EntryKind, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    /// File whose reader returns an error once `fail_after` bytes were read.
    Failing { content: Vec<u8>, fail_after: usize },
    Dir,
    /// Exists but cannot be opened.
    Unreadable,
}

/// In-memory filesystem keyed by exact path.
///
/// Parent directories of added files are created implicitly. Paths are used
/// as given, so tests should stick to absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(path.as_ref(), MockEntry::File(content.into()));
    }

    pub fn add_failing_file(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        fail_after: usize,
    ) {
        self.insert(
            path.as_ref(),
            MockEntry::Failing {
                content: content.into(),
                fail_after,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Unreadable);
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.entries.lock().unwrap().remove(path.as_ref());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
        entries.insert(path.to_path_buf(), entry);
    }
}

impl FileSystem for MockFileSystem {
    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let entries = self.entries.lock().unwrap();
        entries.get(path).map(|e| match e {
            MockEntry::File(content) | MockEntry::Failing { content, .. } => EntryKind::File {
                len: content.len() as u64,
            },
            MockEntry::Dir => EntryKind::Dir,
            MockEntry::Unreadable => EntryKind::File { len: 0 },
        })
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Failing {
                content,
                fail_after,
            }) => Ok(Box::new(FailingReader {
                inner: Cursor::new(content.clone()),
                remaining: *fail_after,
            })),
            Some(MockEntry::Dir) => Err(io::Error::other(format!(
                "is a directory: {:?}",
                path
            ))),
            Some(MockEntry::Unreadable) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )),
        }
    }

    fn check_readable(&self, path: &Path) -> Result<()> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::Unreadable) => Err(anyhow!("permission denied: {:?}", path)),
            Some(_) => Ok(()),
            None => Err(anyhow!("not found: {:?}", path)),
        }
    }
}

struct FailingReader {
    inner: Cursor<Vec<u8>>,
    remaining: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::other("simulated read failure"));
        }
        let limit = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..limit])?;
        self.remaining -= n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_are_created_implicitly() {
        let fs = MockFileSystem::new();
        fs.add_file("/srv/data/a.txt", b"abc");
        assert_eq!(fs.entry_kind(Path::new("/srv/data")), Some(EntryKind::Dir));
        assert_eq!(fs.entry_kind(Path::new("/srv")), Some(EntryKind::Dir));
        assert_eq!(
            fs.entry_kind(Path::new("/srv/data/a.txt")),
            Some(EntryKind::File { len: 3 })
        );
    }

    #[test]
    fn failing_reader_errors_after_limit() {
        let fs = MockFileSystem::new();
        fs.add_failing_file("/f", vec![7u8; 10], 4);
        let mut r = fs.open_read(Path::new("/f")).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(r.read(&mut buf).unwrap(), 4);
        assert!(r.read(&mut buf).is_err());
    }
}
