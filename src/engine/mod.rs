// src/engine/mod.rs

//! Event classification and dispatch.
//!
//! This module ties together:
//! - the raw/semantic event model ([`event`])
//! - the flag-to-message table ([`flag_mapping`])
//! - exclusion policy, directory de-duplication and chunking
//! - dropping the open events our own large-file reads cause ([`echo`])
//! - the classifier that combines them ([`classifier`])
//! - the async loop feeding notifications through it ([`runtime`])
//!
//! Everything except [`runtime`] is synchronous and free of Tokio types, so
//! it can be unit tested against [`crate::fs::mock::MockFileSystem`].

pub mod chunker;
pub mod classifier;
pub mod dir_tracker;
pub mod echo;
pub mod event;
pub mod exclusion;
pub mod flag_mapping;
pub mod runtime;

pub use chunker::{chunk_topic, split, Chunk, ChunkSplitter};
pub use classifier::{
    ClassifierSettings, EventClassifier, DEFAULT_CHUNK_SIZE, DEFAULT_LARGE_FILE_THRESHOLD,
};
pub use dir_tracker::DirectoryOpenTracker;
pub use echo::{SelfReadEchoes, SELF_READ_ECHO_WINDOW};
pub use event::{
    EventFlags, LocalNotice, MessageKind, MessageSink, Payload, RawNotification, SemanticMessage,
};
pub use exclusion::{ExclusionFilter, DEFAULT_EXCLUDES};
pub use runtime::{LoopStats, WatchLoop};
