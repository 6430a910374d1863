// src/publish/mqtt.rs

//! MQTT publisher built on `rumqttc`.
//!
//! `rumqttc` splits a connection into an [`AsyncClient`] (a handle that
//! enqueues requests) and an [`EventLoop`] that must be polled to do any
//! network IO. [`MqttPublisher::connect`] polls the event loop until the
//! broker acknowledges the connection, retrying refusals, then moves the event
//! loop into a background task. Publishing enqueues into the client's
//! bounded request queue. When that queue is full the publisher waits for
//! room, which is how a slow broker slows the watch loop down instead of
//! losing chunks. It never waits for broker acknowledgements.

use std::io::ErrorKind;
use std::time::Duration;

use rumqttc::{
    AsyncClient, ClientError, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    Request,
};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::engine::event::Payload;
use crate::errors::{MqttWatchError, PublishError, Result};
use crate::publish::retry::{retry_until_connected, ConnectAttempt, Connector};
use crate::publish::Publisher;
use crate::types::QosLevel;

/// How long shutdown waits for queued messages and the disconnect to flush.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything needed to reach the broker.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub address: String,
    pub port: u16,
    pub client_id: String,
    pub qos: QosLevel,
    pub keep_alive: Duration,
    pub retry_delay: Duration,
    /// Capacity of the client's request queue.
    pub queue_capacity: usize,
    /// Largest packet accepted or sent, in bytes. Must fit a whole chunk.
    pub max_packet_size: usize,
}

impl BrokerSettings {
    fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.address, self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_max_packet_size(self.max_packet_size, self.max_packet_size);
        options
    }
}

/// Sort a connection error into retry / give up.
pub fn classify_connection_error(err: ConnectionError) -> ConnectAttempt {
    match err {
        ConnectionError::Io(e)
            if matches!(
                e.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::TimedOut
            ) =>
        {
            ConnectAttempt::Refused(e.to_string())
        }
        ConnectionError::ConnectionRefused(code) => {
            ConnectAttempt::Refused(format!("broker refused connection: {code:?}"))
        }
        ConnectionError::NetworkTimeout => ConnectAttempt::Refused("network timeout".to_string()),
        other => ConnectAttempt::Fatal(MqttWatchError::BrokerError(other.to_string())),
    }
}

struct EventLoopConnector {
    eventloop: EventLoop,
}

impl Connector for EventLoopConnector {
    async fn attempt(&mut self) -> ConnectAttempt {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => return ConnectAttempt::Connected,
                Ok(event) => trace!(?event, "mqtt event while connecting"),
                Err(err) => return classify_connection_error(err),
            }
        }
    }
}

/// [`Publisher`] backed by an `rumqttc` client.
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
}

impl MqttPublisher {
    /// Wrap an existing client. The caller is responsible for polling its
    /// event loop.
    pub fn from_client(client: AsyncClient, qos: QosLevel) -> Self {
        Self {
            client,
            qos: qos.into(),
        }
    }

    /// Connect to the broker, retrying refusals every `retry_delay`.
    ///
    /// On success returns the publisher and the handle of the background task
    /// driving the connection; that task stops when `cancel` fires. Returns
    /// `Ok(None)` if `cancel` fires before the broker accepts.
    pub async fn connect(
        settings: &BrokerSettings,
        cancel: CancellationToken,
    ) -> Result<Option<(Self, JoinHandle<()>)>> {
        let (client, eventloop) = AsyncClient::new(settings.mqtt_options(), settings.queue_capacity);
        info!(
            address = %settings.address,
            port = settings.port,
            client_id = %settings.client_id,
            "connecting to mqtt broker"
        );

        let mut connector = EventLoopConnector { eventloop };
        if !retry_until_connected(&mut connector, settings.retry_delay, &cancel).await? {
            return Ok(None);
        }

        let driver = spawn_driver(
            connector.eventloop,
            client.clone(),
            settings.retry_delay,
            cancel,
        );
        Ok(Some((Self::from_client(client, settings.qos), driver)))
    }
}

impl MqttPublisher {
    /// Wait for room in the request queue and enqueue `publish`.
    ///
    /// Only possible off the async executor: inside `block_in_place` on a
    /// multi-threaded runtime, where the watch loop runs the classifier, or
    /// on a plain thread.
    fn publish_waiting(
        &self,
        topic: &str,
        publish: rumqttc::Publish,
    ) -> std::result::Result<(), PublishError> {
        let send = self
            .client
            .publish_bytes(topic, self.qos, false, publish.payload);
        let handle = match Handle::try_current() {
            Ok(h) if h.runtime_flavor() == RuntimeFlavor::MultiThread => h,
            Ok(_) => {
                return Err(PublishError::QueueFull {
                    topic: topic.to_string(),
                });
            }
            Err(_) => return send_on_fresh_runtime(send, topic),
        };
        handle.block_on(send).map_err(|e| client_error(topic, e))
    }
}

fn client_error(topic: &str, e: ClientError) -> PublishError {
    PublishError::Client {
        topic: topic.to_string(),
        reason: e.to_string(),
    }
}

fn send_on_fresh_runtime(
    send: impl std::future::Future<Output = std::result::Result<(), ClientError>>,
    topic: &str,
) -> std::result::Result<(), PublishError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| PublishError::Client {
            topic: topic.to_string(),
            reason: format!("cannot build runtime to wait on the send queue: {e}"),
        })?;
    rt.block_on(send).map_err(|e| client_error(topic, e))
}

impl Publisher for MqttPublisher {
    /// Enqueue without waiting when there is room. A full queue means the
    /// broker is slower than the watched files; wait for room rather than
    /// drop, so chunk sequences keep no gaps.
    fn publish(&self, topic: &str, payload: Payload) -> std::result::Result<(), PublishError> {
        if !rumqttc::valid_topic(topic) {
            return Err(PublishError::Client {
                topic: topic.to_string(),
                reason: "wildcards are not allowed in publish topics".to_string(),
            });
        }
        let bytes: Vec<u8> = payload.into();
        match self.client.try_publish(topic, self.qos, false, bytes) {
            Ok(()) => Ok(()),
            // Full queue, or the event loop is gone; a waiting send tells
            // the two apart.
            Err(ClientError::TryRequest(Request::Publish(publish))) => {
                trace!(topic, "mqtt request queue full; waiting");
                self.publish_waiting(topic, publish)
            }
            Err(e) => Err(client_error(topic, e)),
        }
    }
}

/// Poll the event loop until cancelled, then flush and disconnect.
///
/// `rumqttc` reconnects on the next poll after an error, so errors are only
/// logged and followed by a pause.
fn spawn_driver(
    mut eventloop: EventLoop,
    client: AsyncClient,
    retry_delay: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                res = eventloop.poll() => match res {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => info!("mqtt reconnected"),
                    Ok(event) => trace!(?event, "mqtt event"),
                    Err(err) => {
                        warn!(error = %err, "mqtt connection error; retrying in {:?}", retry_delay);
                        tokio::time::sleep(retry_delay).await;
                    }
                },
            }
        }

        if client.try_disconnect().is_ok() {
            let flush = async {
                loop {
                    match eventloop.poll().await {
                        Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
            };
            if tokio::time::timeout(SHUTDOWN_FLUSH_TIMEOUT, flush).await.is_err() {
                debug!("timed out flushing mqtt disconnect");
            }
        }
        info!("mqtt driver stopped");
    })
}
