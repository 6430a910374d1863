use std::sync::{Arc, Mutex};

use std::time::Duration;

use mqttwatch::engine::Payload;
use mqttwatch::errors::PublishError;
use mqttwatch::publish::Publisher;

/// A fake publisher that records every `(topic, payload)` it is handed.
///
/// Clones share the same record, so a test can keep one clone while the
/// watch loop owns the other.
/// An optional per-message delay stands in for a broker that is slower than
/// the disk.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    sent: Arc<Mutex<Vec<(String, Payload)>>>,
    delay: Option<Duration>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep the calling thread for `delay` before recording each message.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Snapshot of everything published so far, in order.
    pub fn sent(&self) -> Vec<(String, Payload)> {
        self.sent.lock().unwrap().clone()
    }

    /// Published messages with text payloads, as `(topic, text)`.
    pub fn texts(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|(topic, payload)| {
                payload.as_text().map(|t| (topic.clone(), t.to_string()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &str, payload: Payload) -> Result<(), PublishError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.sent.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }
}
