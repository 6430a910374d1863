// src/publish/mod.rs

//! Outbound side: handing classified messages to the broker.
//!
//! The watch loop talks to a [`Publisher`] instead of an MQTT client directly.
//! Production uses [`MqttPublisher`]; tests provide a recording fake.
//!
//! - [`retry`] holds the connect-until-success loop.
//! - [`mqtt`] wraps `rumqttc` and drives its event loop in the background.

pub mod mqtt;
pub mod retry;

use tracing::warn;

use crate::engine::event::{LocalNotice, MessageSink, Payload, SemanticMessage};
use crate::errors::PublishError;

pub use mqtt::{BrokerSettings, MqttPublisher};
pub use retry::{retry_until_connected, ConnectAttempt, Connector};

/// Message transmission without delivery tracking.
///
/// `publish` hands the message to the client and returns. It may wait for
/// room in a local send queue but never for a broker acknowledgement. An
/// `Err` means the message was dropped; [`PublishSink`] logs and counts it,
/// nothing further up sees it.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, payload: Payload) -> Result<(), PublishError>;
}

/// Adapts a [`Publisher`] to the classifier's [`MessageSink`].
pub struct PublishSink<'a> {
    publisher: &'a dyn Publisher,
    sent: u64,
    dropped: u64,
}

impl<'a> PublishSink<'a> {
    pub fn new(publisher: &'a dyn Publisher) -> Self {
        Self {
            publisher,
            sent: 0,
            dropped: 0,
        }
    }

    /// Messages the publisher accepted.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Messages the publisher rejected.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl MessageSink for PublishSink<'_> {
    fn emit(&mut self, message: SemanticMessage) {
        match self.publisher.publish(&message.topic, message.payload) {
            Ok(()) => self.sent += 1,
            Err(err) => {
                self.dropped += 1;
                warn!("{err}");
            }
        }
    }

    fn notice(&mut self, _notice: LocalNotice) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::event::MessageKind;

    /// Accepts text and rejects every chunk.
    struct RejectsChunks;

    impl Publisher for RejectsChunks {
        fn publish(&self, topic: &str, payload: Payload) -> Result<(), PublishError> {
            match payload {
                Payload::Text(_) => Ok(()),
                Payload::Bytes(_) => Err(PublishError::QueueFull {
                    topic: topic.to_string(),
                }),
            }
        }
    }

    #[test]
    fn rejected_messages_are_counted_apart_from_sent_ones() {
        let publisher = RejectsChunks;
        let mut sink = PublishSink::new(&publisher);
        sink.emit(SemanticMessage::text(
            MessageKind::FileCreated,
            "/w/a",
            "New File /w/a has been Created",
        ));
        sink.emit(SemanticMessage::chunk("/w/a/chunk_1", vec![1, 2]));
        sink.emit(SemanticMessage::chunk("/w/a/chunk_2", vec![3]));
        assert_eq!(sink.sent(), 1);
        assert_eq!(sink.dropped(), 2);
    }
}
