// src/engine/classifier.rs

//! Turning one raw notification into semantic messages.
//!
//! The classifier is synchronous and owns all of its state, so the watch loop
//! can run it one notification at a time without locks. Decision order:
//!
//! 1. Resolve the absolute entry path; it doubles as the topic.
//! 2. Existing regular file: small files go through the flag table, large
//!    files are streamed as chunks regardless of flags.
//! 3. Existing directory (tree watch only): announce it the first time.
//! 4. Missing entry, single-file watch: flag table, exclusion bypassed.
//! 5. Missing entry, tree watch: flag table unless excluded; excluded deletes
//!    are still reported, anything else becomes a local notice.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::chunker::{chunk_topic, split};
use crate::engine::dir_tracker::DirectoryOpenTracker;
use crate::engine::echo::SelfReadEchoes;
use crate::engine::event::{
    EventFlags, LocalNotice, MessageKind, MessageSink, RawNotification, SemanticMessage,
};
use crate::engine::exclusion::ExclusionFilter;
use crate::engine::flag_mapping::{map_flags, Mapped};
use crate::errors::Result;
use crate::fs::{EntryKind, FileSystem};
use crate::types::WatchTarget;
use crate::watch::path_utils::{absolute, path_str};

/// Files larger than this are streamed as chunks.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Size of each streamed chunk.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(256 * 1024) {
    Some(n) => n,
    None => unreachable!(),
};

/// Size limits used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Files with `len > large_file_threshold` are chunked.
    pub large_file_threshold: u64,
    pub chunk_size: NonZeroUsize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug)]
pub struct EventClassifier {
    fs: Arc<dyn FileSystem>,
    target: WatchTarget,
    exclusion: ExclusionFilter,
    tracker: DirectoryOpenTracker,
    echoes: SelfReadEchoes,
    settings: ClassifierSettings,
}

/// Wraps the caller's sink to count published messages and log each one.
struct Counting<'a> {
    inner: &'a mut dyn MessageSink,
    published: usize,
}

impl Counting<'_> {
    fn emit(&mut self, message: SemanticMessage) {
        match message.kind {
            MessageKind::ChunkPayload => debug!(
                topic = %message.topic,
                bytes = message.payload.len(),
                "emitting chunk"
            ),
            kind => info!(topic = %message.topic, %kind, payload = ?message.payload.as_text(), "emitting message"),
        }
        self.published += 1;
        self.inner.emit(message);
    }

    fn notice(&mut self, notice: LocalNotice) {
        info!("{notice}");
        self.inner.notice(notice);
    }

    fn apply(&mut self, mapped: Vec<Mapped>) {
        for m in mapped {
            match m {
                Mapped::Publish(msg) => self.emit(msg),
                Mapped::Notice(n) => self.notice(n),
            }
        }
    }
}

impl EventClassifier {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        target: WatchTarget,
        exclusion: ExclusionFilter,
        settings: ClassifierSettings,
    ) -> Self {
        Self {
            fs,
            target,
            exclusion,
            tracker: DirectoryOpenTracker::new(),
            echoes: SelfReadEchoes::new(),
            settings,
        }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn settings(&self) -> ClassifierSettings {
        self.settings
    }

    pub fn tracker(&self) -> &DirectoryOpenTracker {
        &self.tracker
    }

    /// Classify one notification, pushing messages to `sink` in order.
    ///
    /// Returns how many messages were published. An `Err` means a large file
    /// could not be read; chunks emitted before the failure stay emitted.
    pub fn classify(
        &mut self,
        notification: &RawNotification,
        sink: &mut dyn MessageSink,
    ) -> Result<usize> {
        let path = absolute(&notification.joined());
        let topic = path_str(&path);
        let flags = notification.flags;
        let mut out = Counting {
            inner: sink,
            published: 0,
        };

        debug!(path = %topic, ?flags, "classifying notification");

        if self.echoes.absorb(&path, flags) {
            debug!(path = %topic, "ignoring open caused by our own read");
            return Ok(0);
        }

        match self.fs.entry_kind(&path) {
            Some(EntryKind::File { len }) if len <= self.settings.large_file_threshold => {
                out.apply(map_flags(flags, &topic));
            }
            Some(EntryKind::File { len }) => {
                info!(path = %topic, len, "processing large file");
                self.stream_chunks(&path, &topic, &mut out)?;
            }
            Some(EntryKind::Dir | EntryKind::Other) => {
                self.announce_directory(&path, &topic, &mut out);
            }
            None if self.target.is_single_file() => {
                out.apply(map_flags(flags, &topic));
            }
            None if !self.exclusion.excluded(&path) => {
                out.apply(map_flags(flags, &topic));
            }
            None => self.report_excluded(flags, &topic, &mut out),
        }

        Ok(out.published)
    }

    /// Collect everything `classify` publishes into a `Vec`.
    pub fn classify_to_vec(
        &mut self,
        notification: &RawNotification,
    ) -> Result<Vec<SemanticMessage>> {
        let mut messages = Vec::new();
        self.classify(notification, &mut messages)?;
        Ok(messages)
    }

    fn announce_directory(&mut self, path: &Path, topic: &str, out: &mut Counting<'_>) {
        if !self.target.is_recursive() {
            return;
        }
        if self.tracker.announce_once(path) {
            out.emit(SemanticMessage::text(
                MessageKind::DirectoryOpened,
                topic,
                format!("Opened : {topic}"),
            ));
        }
    }

    fn report_excluded(&self, flags: EventFlags, topic: &str, out: &mut Counting<'_>) {
        if flags.contains(EventFlags::DELETED) {
            out.emit(SemanticMessage::text(
                MessageKind::FileDeleted,
                topic,
                format!("Deleted file: {topic}"),
            ));
        } else {
            out.notice(LocalNotice::InvalidPath {
                path: topic.to_string(),
            });
        }
    }

    fn stream_chunks(&mut self, path: &Path, topic: &str, out: &mut Counting<'_>) -> Result<()> {
        let reader = self.fs.open_read(path).inspect_err(|e| {
            warn!(path = %topic, error = %e, "error opening large file");
        })?;
        let streamed = self.send_chunks(reader, topic, out);
        // Recorded after streaming so the window starts once the loop is
        // free to see the echo.
        self.echoes.record(path);
        streamed
    }

    fn send_chunks(
        &self,
        reader: Box<dyn std::io::Read + Send>,
        topic: &str,
        out: &mut Counting<'_>,
    ) -> Result<()> {
        for chunk in split(reader, self.settings.chunk_size) {
            let chunk = chunk.inspect_err(|e| {
                warn!(path = %topic, error = %e, "error processing large file");
            })?;
            let number = chunk.number;
            out.emit(SemanticMessage::chunk(chunk_topic(topic, number), chunk.bytes));
            debug!(path = %topic, chunk = number, "sent chunk");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn small_settings() -> ClassifierSettings {
        ClassifierSettings {
            large_file_threshold: 16,
            chunk_size: NonZeroUsize::new(6).unwrap(),
        }
    }

    fn tree_classifier(fs: &MockFileSystem, excludes: &[&str]) -> EventClassifier {
        EventClassifier::new(
            Arc::new(fs.clone()),
            WatchTarget::directory_tree("/w"),
            ExclusionFilter::new(excludes.iter().copied()).unwrap(),
            small_settings(),
        )
    }

    #[test]
    fn small_file_runs_flag_table() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt", b"hello");
        let mut c = tree_classifier(&fs, &[]);

        let n = RawNotification::new("/w", "a.txt", EventFlags::CREATED | EventFlags::CLOSED_AFTER_WRITE);
        let msgs = c.classify_to_vec(&n).unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(msgs.iter().all(|m| m.topic == "/w/a.txt"));
    }

    #[test]
    fn file_at_threshold_is_not_chunked() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/edge", vec![0u8; 16]);
        let mut c = tree_classifier(&fs, &[]);
        let msgs = c
            .classify_to_vec(&RawNotification::new("/w", "edge", EventFlags::CLOSED_AFTER_WRITE))
            .unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].kind, MessageKind::FileModifiedClosed);
    }

    #[test]
    fn large_file_is_chunked_regardless_of_flags() {
        let fs = MockFileSystem::new();
        let data: Vec<u8> = (0u8..17).collect();
        fs.add_file("/w/big", data.clone());
        let mut c = tree_classifier(&fs, &[]);

        let msgs = c
            .classify_to_vec(&RawNotification::new("/w", "big", EventFlags::ACCESSED))
            .unwrap();
        let topics: Vec<&str> = msgs.iter().map(|m| m.topic.as_str()).collect();
        assert_eq!(topics, vec!["/w/big/chunk_1", "/w/big/chunk_2", "/w/big/chunk_3"]);
        assert!(msgs.iter().all(|m| m.kind == MessageKind::ChunkPayload));
        let joined: Vec<u8> = msgs.iter().flat_map(|m| m.payload.as_bytes().to_vec()).collect();
        assert_eq!(joined, data);
    }

    #[test]
    fn open_echo_of_our_own_read_is_not_streamed_again() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/big", vec![3u8; 17]);
        let mut c = tree_classifier(&fs, &[]);

        let written = RawNotification::new("/w", "big", EventFlags::CLOSED_AFTER_WRITE);
        assert_eq!(c.classify_to_vec(&written).unwrap().len(), 3);

        let echo = RawNotification::new("/w", "big", EventFlags::OPENED);
        assert!(c.classify_to_vec(&echo).unwrap().is_empty());

        // A second open is someone else's and streams as usual.
        assert_eq!(c.classify_to_vec(&echo).unwrap().len(), 3);
    }

    #[test]
    fn read_failure_keeps_earlier_chunks_and_errors() {
        let fs = MockFileSystem::new();
        fs.add_failing_file("/w/big", vec![1u8; 40], 12);
        let mut c = tree_classifier(&fs, &[]);

        let mut sink: Vec<SemanticMessage> = Vec::new();
        let res = c.classify(
            &RawNotification::new("/w", "big", EventFlags::CLOSED_AFTER_WRITE),
            &mut sink,
        );
        assert!(res.is_err());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].topic, "/w/big/chunk_2");
    }

    #[test]
    fn directory_is_announced_once_in_tree_mode() {
        let fs = MockFileSystem::new();
        fs.add_dir("/w/sub");
        let mut c = tree_classifier(&fs, &[]);
        let n = RawNotification::new("/w", "sub", EventFlags::CREATED | EventFlags::IS_DIRECTORY);

        let first = c.classify_to_vec(&n).unwrap();
        assert_eq!(
            first,
            vec![SemanticMessage::text(
                MessageKind::DirectoryOpened,
                "/w/sub",
                "Opened : /w/sub"
            )]
        );
        assert!(c.classify_to_vec(&n).unwrap().is_empty());
        assert_eq!(c.tracker().len(), 1);
    }

    #[test]
    fn directory_is_silent_in_single_file_mode() {
        let fs = MockFileSystem::new();
        fs.add_dir("/w");
        let mut c = EventClassifier::new(
            Arc::new(fs),
            WatchTarget::file("/w/a.txt"),
            ExclusionFilter::none(),
            small_settings(),
        );
        let msgs = c
            .classify_to_vec(&RawNotification::new("/w", "", EventFlags::OPENED))
            .unwrap();
        assert!(msgs.is_empty());
    }

    #[test]
    fn missing_excluded_delete_is_still_reported() {
        let fs = MockFileSystem::new();
        let mut c = tree_classifier(&fs, &["/w/.git"]);
        let msgs = c
            .classify_to_vec(&RawNotification::new("/w/.git", "index.lock", EventFlags::DELETED))
            .unwrap();
        assert_eq!(
            msgs,
            vec![SemanticMessage::text(
                MessageKind::FileDeleted,
                "/w/.git/index.lock",
                "Deleted file: /w/.git/index.lock"
            )]
        );
    }

    #[test]
    fn missing_not_excluded_runs_flag_table() {
        let fs = MockFileSystem::new();
        let mut c = tree_classifier(&fs, &["/w/.git"]);
        let msgs = c
            .classify_to_vec(&RawNotification::new("/w", "gone.txt", EventFlags::DELETED))
            .unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].payload.as_text(), Some("File /w/gone.txt is Deleted"));
    }

    #[test]
    fn single_file_watch_bypasses_exclusion() {
        let fs = MockFileSystem::new();
        let mut c = EventClassifier::new(
            Arc::new(fs),
            WatchTarget::file("/w/.hidden"),
            ExclusionFilter::new(["/w/.*"]).unwrap(),
            small_settings(),
        );
        let msgs = c
            .classify_to_vec(&RawNotification::new("/w", ".hidden", EventFlags::MOVED_FROM))
            .unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].kind, MessageKind::FileMovedFrom);
    }
}
