// src/engine/event.rs

//! Raw notifications coming in and semantic messages going out.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use bitflags::bitflags;

bitflags! {
    /// Flags carried by one raw notification.
    ///
    /// Bit values mirror the Linux inotify mask (`IN_ACCESS`, `IN_CLOSE_WRITE`,
    /// ...), so a kernel mask converts with [`EventFlags::from_inotify_mask`].
    /// Several flags may be set at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventFlags: u32 {
        const ACCESSED             = 0x0000_0001;
        const CLOSED_AFTER_WRITE   = 0x0000_0008;
        const CLOSED_WITHOUT_WRITE = 0x0000_0010;
        const OPENED               = 0x0000_0020;
        const MOVED_FROM           = 0x0000_0040;
        const MOVED_TO             = 0x0000_0080;
        const CREATED              = 0x0000_0100;
        const DELETED              = 0x0000_0200;
        const IS_DIRECTORY         = 0x4000_0000;
    }
}

impl EventFlags {
    /// Keep the bits this crate understands and drop everything else
    /// (`IN_MODIFY`, `IN_ATTRIB`, ...).
    pub fn from_inotify_mask(mask: u32) -> Self {
        Self::from_bits_truncate(mask)
    }
}

/// One low-level filesystem change notification.
///
/// `path` is the watched directory the event was reported against and
/// `name` the entry inside it (empty when the event is about `path` itself).
/// `name` stays an `OsString` so non-UTF-8 entries still resolve on disk;
/// only the topic is lossy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    pub path: PathBuf,
    pub name: OsString,
    pub flags: EventFlags,
}

impl RawNotification {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<OsString>, flags: EventFlags) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            flags,
        }
    }

    /// Split a full entry path into directory + name.
    pub fn for_entry(entry: &Path, flags: EventFlags) -> Self {
        match (entry.parent(), entry.file_name()) {
            (Some(parent), Some(name)) => Self::new(parent, name, flags),
            _ => Self::new(entry, OsString::new(), flags),
        }
    }

    /// `path` joined with `name`, not yet made absolute.
    pub fn joined(&self) -> PathBuf {
        if self.name.is_empty() {
            self.path.clone()
        } else {
            self.path.join(&self.name)
        }
    }
}

/// What a published message reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    FileCreated,
    FileModifiedClosed,
    FileUnmodified,
    FileDeleted,
    FileMovedFrom,
    FileMovedTo,
    FileOpened,
    DirectoryOpened,
    ChunkPayload,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageKind::FileCreated => "file_created",
            MessageKind::FileModifiedClosed => "file_modified_closed",
            MessageKind::FileUnmodified => "file_unmodified",
            MessageKind::FileDeleted => "file_deleted",
            MessageKind::FileMovedFrom => "file_moved_from",
            MessageKind::FileMovedTo => "file_moved_to",
            MessageKind::FileOpened => "file_opened",
            MessageKind::DirectoryOpened => "directory_opened",
            MessageKind::ChunkPayload => "chunk_payload",
        };
        f.write_str(s)
    }
}

/// Message body: UTF-8 text for events, raw bytes for chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(s) => s.as_bytes(),
            Payload::Bytes(b) => b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            Payload::Bytes(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Payload> for Vec<u8> {
    fn from(p: Payload) -> Self {
        match p {
            Payload::Text(s) => s.into_bytes(),
            Payload::Bytes(b) => b,
        }
    }
}

/// A classified event ready for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticMessage {
    pub topic: String,
    pub payload: Payload,
    pub kind: MessageKind,
}

impl SemanticMessage {
    pub fn text(kind: MessageKind, topic: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: Payload::Text(body.into()),
            kind,
        }
    }

    pub fn chunk(topic: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            payload: Payload::Bytes(bytes),
            kind: MessageKind::ChunkPayload,
        }
    }
}

/// Diagnostics that are logged but never published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalNotice {
    /// Opened without a matching close-without-write.
    FileOpened { path: String },
    /// Missing, excluded, and not a delete.
    InvalidPath { path: String },
}

impl fmt::Display for LocalNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalNotice::FileOpened { path } => write!(f, "File is opened: {path}"),
            LocalNotice::InvalidPath { path } => write!(f, "Invalid file: {path}"),
        }
    }
}

/// Receiver for classifier output, in emission order.
pub trait MessageSink {
    fn emit(&mut self, message: SemanticMessage);

    fn notice(&mut self, _notice: LocalNotice) {}
}

impl MessageSink for Vec<SemanticMessage> {
    fn emit(&mut self, message: SemanticMessage) {
        self.push(message);
    }
}
