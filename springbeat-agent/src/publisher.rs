//! Event publishing for polled actuator stats
//!
//! Every successful poll becomes one JSON event on
//! `<topic_prefix>/<type>@v1`:
//! `{"@timestamp", "type", "counter", "source", "beat", "<type>": {...}}`
//! Metrics events also carry `diagnostics` when the snapshot had anomalies.

use crate::config::MqttConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde::Serialize;
use springbeat_core::{ApplicationInfo, Diagnostic, HealthStatus, NormalizedMetrics};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

/// Destination of serialized events
pub trait EventSink {
    fn publish(&self, topic: String, payload: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

/// Actuator endpoint an event was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsKind {
    Metrics,
    Health,
    Info,
}

impl StatsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatsKind::Metrics => "metrics",
            StatsKind::Health => "health",
            StatsKind::Info => "info",
        }
    }

    pub fn topic(self, prefix: &str) -> String {
        format!("{}/{}@v1", prefix, self.as_str())
    }
}

/// Decoded body of one endpoint, flattened into the event under its type name
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Metrics {
        metrics: NormalizedMetrics,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        diagnostics: Vec<Diagnostic>,
    },
    Health {
        health: HealthStatus,
    },
    Info {
        info: ApplicationInfo,
    },
}

impl Payload {
    pub fn kind(&self) -> StatsKind {
        match self {
            Payload::Metrics { .. } => StatsKind::Metrics,
            Payload::Health { .. } => StatsKind::Health,
            Payload::Info { .. } => StatsKind::Info,
        }
    }
}

/// Identity of the publishing beat
#[derive(Debug, Clone, Serialize)]
pub struct BeatInfo {
    pub name: String,
    pub hostname: String,
    pub version: String,
}

impl BeatInfo {
    pub fn local() -> Self {
        Self {
            name: "springbeat".to_string(),
            hostname: gethostname::gethostname().to_string_lossy().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BeatEvent<'a> {
    #[serde(rename = "@timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: StatsKind,
    counter: u64,
    source: &'a str,
    beat: &'a BeatInfo,
    #[serde(flatten)]
    payload: &'a Payload,
}

/// Wraps payloads into events and hands them to a sink
pub struct Publisher<S> {
    sink: S,
    topic_prefix: String,
    beat: BeatInfo,
    counter: u64,
}

impl<S: EventSink> Publisher<S> {
    pub fn new(sink: S, topic_prefix: impl Into<String>, beat: BeatInfo) -> Self {
        Self {
            sink,
            topic_prefix: topic_prefix.into(),
            beat,
            counter: 0,
        }
    }

    /// Number of events published so far
    pub fn published(&self) -> u64 {
        self.counter
    }

    pub async fn publish(&mut self, source: &str, payload: &Payload) -> Result<()> {
        let kind = payload.kind();
        let counter = self.counter + 1;

        let event = BeatEvent {
            timestamp: Utc::now(),
            kind,
            counter,
            source,
            beat: &self.beat,
            payload,
        };

        let body = serde_json::to_vec(&event).context("Failed to serialize event")?;
        self.sink
            .publish(kind.topic(&self.topic_prefix), body)
            .await
            .with_context(|| format!("Failed to publish {} event", kind.as_str()))?;

        self.counter = counter;
        debug!("Published {} event #{} for {}", kind.as_str(), counter, source);
        Ok(())
    }
}

/// MQTT sink backed by `rumqttc`
#[derive(Clone)]
pub struct MqttSink {
    client: AsyncClient,
}

impl MqttSink {
    /// Create the client and drive its event loop in the background
    pub fn connect(config: &MqttConfig, client_id: &str) -> Self {
        let mut mqtt_options = MqttOptions::new(client_id, &config.broker_host, config.broker_port);
        mqtt_options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        mqtt_options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(mqtt_options, 10);

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                        debug!("MQTT connection established");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("MQTT connection error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        });

        Self { client }
    }
}

impl EventSink for MqttSink {
    async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .context("MQTT publish failed")
    }
}
