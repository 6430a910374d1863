// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod publish;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_or_default, validate_watch_path, ConfigFile, RawConfigFile};
use crate::engine::{EventClassifier, ExclusionFilter, WatchLoop};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::publish::{BrokerSettings, MqttPublisher};

/// Extra room on top of a chunk for the MQTT header and topic.
const PACKET_OVERHEAD: usize = 64 * 1024;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - watch path validation and config loading
/// - the filesystem watcher
/// - the broker connection (retried until it succeeds)
/// - the classifier and its watch loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let target = validate_watch_path(fs.as_ref(), &args.path)?;
    let cfg = effective_config(&args)?;
    debug!(?cfg, ?target, "configuration loaded");

    let exclusion = ExclusionFilter::new(cfg.watch.excludes())?;
    let classifier = EventClassifier::new(
        Arc::clone(&fs),
        target.clone(),
        exclusion,
        cfg.classifier_settings(),
    );

    let cancel = CancellationToken::new();

    // Ctrl-C → graceful shutdown.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received");
            cancel.cancel();
        });
    }

    // Start watching before connecting so nothing raised meanwhile is lost.
    let (_watcher, notifications) = watch::spawn_watch_source(&target)?;

    let broker = broker_settings(&args, &cfg);
    let Some((publisher, driver)) = MqttPublisher::connect(&broker, cancel.clone()).await? else {
        info!("shutdown requested before the broker accepted a connection");
        return Ok(());
    };

    let stats = WatchLoop::new(classifier, publisher, notifications, cancel.clone())
        .run()
        .await;
    info!(
        notifications = stats.notifications,
        published = stats.published,
        dropped = stats.dropped,
        failures = stats.failures,
        "watch loop finished"
    );

    cancel.cancel();
    if let Err(e) = driver.await {
        warn!("mqtt driver task failed: {e}");
    }
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied, validated.
pub fn effective_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = load_or_default(args.config.as_deref())?;
    apply_overrides(&mut raw, args);
    ConfigFile::try_from(raw)
}

fn apply_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if !args.exclude.is_empty() {
        raw.watch.exclude = Some(args.exclude.clone());
    }
    if let Some(size) = args.chunk_size {
        raw.watch.chunk_size = size;
    }
    if let Some(threshold) = args.large_file_threshold {
        raw.watch.large_file_threshold = threshold;
    }
    if let Some(ref id) = args.client_id {
        raw.broker.client_id = id.clone();
    }
    if let Some(qos) = args.qos {
        raw.broker.qos = qos;
    }
}

/// Broker connection settings from the command line and `[broker]`.
pub fn broker_settings(args: &CliArgs, cfg: &ConfigFile) -> BrokerSettings {
    BrokerSettings {
        address: args.address.clone(),
        port: args.port,
        client_id: cfg.broker.client_id.clone(),
        qos: cfg.broker.qos,
        keep_alive: cfg.broker.keep_alive(),
        retry_delay: cfg.broker.retry_delay(),
        queue_capacity: cfg.broker.queue_capacity,
        max_packet_size: cfg.watch.chunk_size + PACKET_OVERHEAD,
    }
}
