// src/engine/runtime.rs

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::classifier::EventClassifier;
use crate::engine::event::RawNotification;
use crate::publish::{PublishSink, Publisher};

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub notifications: u64,
    /// Messages the publisher accepted.
    pub published: u64,
    /// Messages the publisher rejected.
    pub dropped: u64,
    pub failures: u64,
}

/// Drives the classifier over incoming notifications and hands the results
/// to a `Publisher`.
///
/// Notifications are taken one at a time, in channel order, and each one is
/// fully classified (including any chunk streaming) before the next is
/// received. Cancellation is only observed between notifications.
pub struct WatchLoop<P: Publisher> {
    classifier: EventClassifier,
    publisher: P,
    notifications: mpsc::UnboundedReceiver<RawNotification>,
    cancel: CancellationToken,
}

impl<P: Publisher> fmt::Debug for WatchLoop<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLoop")
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

/// Run blocking work without stalling other tasks on a multi-threaded
/// runtime; on a current-thread runtime just run it.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|h| h.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(f),
        _ => f(),
    }
}

impl<P: Publisher> WatchLoop<P> {
    pub fn new(
        classifier: EventClassifier,
        publisher: P,
        notifications: mpsc::UnboundedReceiver<RawNotification>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            classifier,
            publisher,
            notifications,
            cancel,
        }
    }

    /// Main event loop.
    ///
    /// Exits when `cancel` fires or the notification channel closes.
    pub async fn run(mut self) -> LoopStats {
        info!("mqttwatch watch loop started");
        let mut stats = LoopStats::default();

        loop {
            let notification = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("shutdown requested; stopping watch loop");
                    break;
                }
                next = self.notifications.recv() => match next {
                    Some(n) => n,
                    None => {
                        info!("notification channel closed; exiting");
                        break;
                    }
                },
            };

            stats.notifications += 1;
            debug!(?notification, "watch loop received notification");

            let classifier = &mut self.classifier;
            let mut sink = PublishSink::new(&self.publisher);
            let outcome = run_blocking(|| {
                catch_unwind(AssertUnwindSafe(|| {
                    classifier.classify(&notification, &mut sink)
                }))
            });
            stats.published += sink.sent();
            stats.dropped += sink.dropped();

            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(err)) => {
                    stats.failures += 1;
                    warn!(
                        path = %notification.joined().display(),
                        error = %err,
                        "failed to classify notification; continuing"
                    );
                }
                Err(_) => {
                    stats.failures += 1;
                    error!(
                        path = %notification.joined().display(),
                        "classifier panicked; continuing"
                    );
                }
            }
        }

        info!(
            notifications = stats.notifications,
            published = stats.published,
            dropped = stats.dropped,
            failures = stats.failures,
            "watch loop exiting"
        );
        stats
    }
}
