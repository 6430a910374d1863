// src/watch/mod.rs

//! Filesystem watching.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) for the
//!   configured target.
//! - Translating `notify` events into [`RawNotification`]s.
//! - Path normalization shared with the classifier.
//!
//! It does **not** decide what gets published; that is the engine's job.
//!
//! [`RawNotification`]: crate::engine::event::RawNotification

pub mod path_utils;
pub mod translate;
pub mod watcher;

pub use watcher::{spawn_watch_source, WatcherHandle};
