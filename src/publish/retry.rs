// src/publish/retry.rs

//! Retry-until-connected loop for the broker connection.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::Result;
use crate::errors::MqttWatchError;

/// Default pause between refused connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Outcome of a single connection attempt.
#[derive(Debug)]
pub enum ConnectAttempt {
    Connected,
    /// The broker is not accepting connections yet; try again later.
    Refused(String),
    /// Anything that retrying will not fix.
    Fatal(MqttWatchError),
}

/// Something that can try to establish a connection.
#[allow(async_fn_in_trait)]
pub trait Connector {
    async fn attempt(&mut self) -> ConnectAttempt;
}

/// Keep calling `connector.attempt()` until it connects.
///
/// Refusals are logged and retried after `delay`, forever. Returns
/// `Ok(false)` if `cancel` fires before a connection is made.
pub async fn retry_until_connected<C: Connector>(
    connector: &mut C,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<bool> {
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Ok(false),
            outcome = connector.attempt() => outcome,
        };

        match outcome {
            ConnectAttempt::Connected => {
                info!(attempts, "mqtt connected");
                return Ok(true);
            }
            ConnectAttempt::Refused(reason) => {
                warn!(
                    attempt = attempts,
                    %reason,
                    "Connection refused. Retrying in {} seconds...",
                    delay.as_secs_f64()
                );
            }
            ConnectAttempt::Fatal(err) => return Err(err),
        }

        tokio::select! {
            _ = cancel.cancelled() => return Ok(false),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
