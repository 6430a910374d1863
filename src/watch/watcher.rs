// src/watch/watcher.rs

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::event::RawNotification;
use crate::types::WatchTarget;
use crate::watch::translate::translate;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching and close
/// the notification channel.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Start watching `target` and return the stream of raw notifications.
///
/// - File targets are watched non-recursively, directory trees recursively.
/// - The channel is unbounded so notifications arriving while the broker is
///   still connecting are kept until the watch loop drains them.
pub fn spawn_watch_source(
    target: &WatchTarget,
) -> Result<(WatcherHandle, mpsc::UnboundedReceiver<RawNotification>)> {
    let (tx, rx) = mpsc::unbounded_channel::<RawNotification>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                debug!(?event, "received notify event");
                for notification in translate(&event) {
                    if tx.send(notification).is_err() {
                        debug!("notification receiver dropped; discarding event");
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "file watch error");
            }
        },
        Config::default(),
    )?;

    let mode = if target.is_recursive() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(target.path(), mode)?;

    if target.is_single_file() {
        info!("Monitoring file: {}", target.path().display());
    } else {
        info!(
            "Monitoring the entire directory: {}",
            target.path().display()
        );
    }

    Ok((WatcherHandle { _inner: watcher }, rx))
}
