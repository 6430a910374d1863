// src/engine/echo.rs

//! Suppressing notifications caused by our own reads.
//!
//! Streaming a large file opens it, and the watcher reports that open like
//! any other. Since large files are streamed whatever the flags, feeding the
//! echo back in would stream the file again, forever. Each self-read is
//! recorded here and the next open-only notification for that path is
//! absorbed. Records expire so a backend that never reports our opens cannot
//! swallow a real event much later.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::engine::event::EventFlags;

/// How long a self-read stays eligible to absorb its echo.
pub const SELF_READ_ECHO_WINDOW: Duration = Duration::from_secs(10);

/// Flags a plain read can raise.
const READ_ONLY_FLAGS: EventFlags = EventFlags::OPENED
    .union(EventFlags::CLOSED_WITHOUT_WRITE)
    .union(EventFlags::ACCESSED);

#[derive(Debug, Clone, Copy)]
struct Pending {
    count: u32,
    recorded: Instant,
}

#[derive(Debug)]
pub struct SelfReadEchoes {
    pending: HashMap<PathBuf, Pending>,
    window: Duration,
}

impl Default for SelfReadEchoes {
    fn default() -> Self {
        Self::with_window(SELF_READ_ECHO_WINDOW)
    }
}

impl SelfReadEchoes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            window,
        }
    }

    /// Note that `path` was just opened for reading by us.
    pub fn record(&mut self, path: &Path) {
        self.record_at(path, Instant::now());
    }

    /// True if this notification is the echo of a recorded read and should
    /// be dropped. Consumes one record.
    pub fn absorb(&mut self, path: &Path, flags: EventFlags) -> bool {
        self.absorb_at(path, flags, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn record_at(&mut self, path: &Path, now: Instant) {
        self.expire(now);
        let entry = self.pending.entry(path.to_path_buf()).or_insert(Pending {
            count: 0,
            recorded: now,
        });
        entry.count += 1;
        entry.recorded = now;
    }

    fn absorb_at(&mut self, path: &Path, flags: EventFlags, now: Instant) -> bool {
        self.expire(now);
        if flags.is_empty() || !READ_ONLY_FLAGS.contains(flags) {
            return false;
        }
        let Some(entry) = self.pending.get_mut(path) else {
            return false;
        };
        entry.count -= 1;
        if entry.count == 0 {
            self.pending.remove(path);
        }
        true
    }

    fn expire(&mut self, now: Instant) {
        let window = self.window;
        self.pending
            .retain(|_, p| now.saturating_duration_since(p.recorded) <= window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_open_is_absorbed_per_read() {
        let mut e = SelfReadEchoes::new();
        let p = Path::new("/w/big");
        e.record(p);
        assert!(e.absorb(p, EventFlags::OPENED));
        assert!(!e.absorb(p, EventFlags::OPENED));
        assert!(e.is_empty());
    }

    #[test]
    fn writes_and_other_paths_are_never_absorbed() {
        let mut e = SelfReadEchoes::new();
        let p = Path::new("/w/big");
        e.record(p);
        assert!(!e.absorb(p, EventFlags::CLOSED_AFTER_WRITE));
        assert!(!e.absorb(p, EventFlags::OPENED | EventFlags::CREATED));
        assert!(!e.absorb(Path::new("/w/other"), EventFlags::OPENED));
        assert!(e.absorb(p, EventFlags::OPENED | EventFlags::CLOSED_WITHOUT_WRITE));
    }

    #[test]
    fn records_expire() {
        let mut e = SelfReadEchoes::with_window(Duration::from_secs(1));
        let p = Path::new("/w/big");
        let t0 = Instant::now();
        e.record_at(p, t0);
        e.record_at(p, t0);
        assert!(!e.absorb_at(p, EventFlags::OPENED, t0 + Duration::from_secs(2)));
        assert!(e.is_empty());
    }
}
