//! Polling loop
//!
//! Every period, all targets are polled concurrently; each enabled endpoint
//! of a target yields at most one event. Failures are logged and skipped,
//! they never stop the loop.

use crate::config::{BeatConfig, StatsConfig};
use crate::fetcher::{build_http_client, ActuatorClient};
use crate::publisher::{EventSink, Payload, Publisher};
use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

pub struct Beat<S> {
    config: BeatConfig,
    targets: Vec<ActuatorClient>,
    publisher: Publisher<S>,
}

impl<S: EventSink> Beat<S> {
    pub fn new(config: BeatConfig, publisher: Publisher<S>) -> Result<Self> {
        let http = build_http_client(config.http_timeout()).context("Failed to build HTTP client")?;
        let targets = config
            .urls
            .iter()
            .map(|url| ActuatorClient::new(http.clone(), url.as_str()))
            .collect();

        Ok(Self {
            config,
            targets,
            publisher,
        })
    }

    /// Poll until Ctrl-C, returns the number of published events
    pub async fn run(&mut self) -> Result<u64> {
        info!(
            "Polling {} target(s) every {}s",
            self.targets.len(),
            self.config.period_secs
        );

        let mut ticker = interval(self.config.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // created once so a signal sent mid-round is not lost
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                signal = &mut shutdown => {
                    signal.context("Failed to listen for shutdown signal")?;
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        let published = self.publisher.published();
        info!("Springbeat stopped after {} event(s)", published);
        Ok(published)
    }

    /// One polling round over every target, returns the events published
    pub async fn poll_once(&mut self) -> usize {
        let stats = &self.config.stats;
        let rounds = join_all(self.targets.iter().map(|target| poll_target(target, stats))).await;

        let mut published = 0;
        for (target, payloads) in self.targets.iter().zip(rounds) {
            for payload in payloads {
                match self.publisher.publish(target.base_url(), &payload).await {
                    Ok(()) => published += 1,
                    Err(e) => error!("{}: {:#}", target.base_url(), e),
                }
            }
        }

        published
    }
}

/// Fetch every enabled endpoint of one target, in metrics/health/info order
async fn poll_target(target: &ActuatorClient, stats: &StatsConfig) -> Vec<Payload> {
    let url = target.base_url();
    let mut payloads = Vec::new();

    if stats.metrics {
        match target.metrics().await {
            Ok(normalized) => {
                for diagnostic in &normalized.diagnostics {
                    warn!("{}: {}", url, diagnostic);
                }
                payloads.push(Payload::Metrics {
                    metrics: normalized.metrics,
                    diagnostics: normalized.diagnostics,
                });
            }
            Err(e) => error!("Failed to poll metrics of {}: {}", url, e),
        }
    }

    if stats.health {
        match target.health().await {
            Ok(health) => payloads.push(Payload::Health { health }),
            Err(e) => error!("Failed to poll health of {}: {}", url, e),
        }
    }

    if stats.info {
        match target.app_info().await {
            Ok(info) => payloads.push(Payload::Info { info }),
            Err(e) => error!("Failed to poll info of {}: {}", url, e),
        }
    }

    payloads
}
