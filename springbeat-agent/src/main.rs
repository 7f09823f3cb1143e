//! Springbeat Agent - actuator poller
//!
//! Periodically polls Spring Boot actuator endpoints and publishes their
//! content over MQTT:
//! - `/metrics` normalized into a typed statistics model
//! - `/health` and `/info` forwarded as decoded documents
//! - Per-key anomalies reported as event diagnostics

mod beat;
mod config;
mod fetcher;
mod publisher;

use anyhow::{Context, Result};
use beat::Beat;
use config::BeatConfig;
use publisher::{BeatInfo, MqttSink, Publisher};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("springbeat_agent=info")),
        )
        .init();

    info!("Springbeat Agent v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = BeatConfig::load().await.context("Failed to load configuration")?;
    let beat_info = BeatInfo::local();

    let client_id = config.mqtt.client_id_or(&beat_info.hostname);
    info!(
        "Publishing to mqtt://{}:{} as {}",
        config.mqtt.broker_host, config.mqtt.broker_port, client_id
    );
    let sink = MqttSink::connect(&config.mqtt, &client_id);

    let publisher = Publisher::new(sink, config.mqtt.topic_prefix.clone(), beat_info);
    let mut beat = Beat::new(config, publisher).context("Failed to create beat")?;

    beat.run().await.context("Beat execution failed")?;

    Ok(())
}
