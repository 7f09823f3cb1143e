//! Beat configuration
//!
//! Handles:
//! - Actuator targets and polling period
//! - Which actuator endpoints are polled
//! - MQTT broker settings for publishing
//!
//! Read from `SPRINGBEAT_CONFIG`, or `<config dir>/springbeat/config.toml`.
//! A missing file means defaults; an invalid one is an error.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "SPRINGBEAT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatConfig {
    /// Seconds between two polling rounds
    pub period_secs: u64,
    /// Actuator base URLs (sub-paths are appended)
    pub urls: Vec<String>,
    pub stats: StatsConfig,
    pub http: HttpConfig,
    pub mqtt: MqttConfig,
}

/// Endpoints polled on every target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub metrics: bool,
    pub health: bool,
    pub info: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: Option<String>,
    pub keep_alive_secs: u64,
    pub topic_prefix: String,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            period_secs: 10,
            urls: vec!["http://127.0.0.1:8080".to_string()],
            stats: StatsConfig::default(),
            http: HttpConfig::default(),
            mqtt: MqttConfig::default(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            metrics: true,
            health: true,
            info: true,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1883,
            client_id: None,
            keep_alive_secs: 30,
            topic_prefix: "springbeat".to_string(),
        }
    }
}

impl BeatConfig {
    /// Load config from `SPRINGBEAT_CONFIG` or the OS-specific location
    pub async fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::config_file_path()?,
        };
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))?
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("springbeat");
        path.push("config.toml");
        Ok(path)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.period_secs > 0, "period_secs must be greater than zero");
        ensure!(!self.urls.is_empty(), "at least one actuator url is required");
        ensure!(
            self.stats.metrics || self.stats.health || self.stats.info,
            "all stats are disabled, nothing to poll"
        );

        for url in &self.urls {
            let parsed = reqwest::Url::parse(url).with_context(|| format!("Invalid url '{url}'"))?;
            ensure!(
                matches!(parsed.scheme(), "http" | "https"),
                "Unsupported scheme in '{url}'"
            );
        }

        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

impl MqttConfig {
    pub fn client_id_or(&self, hostname: &str) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| format!("springbeat-{hostname}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BeatConfig::default();
        assert_eq!(config.period(), Duration::from_secs(10));
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.mqtt.topic_prefix, "springbeat");
        assert!(config.stats.metrics && config.stats.health && config.stats.info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_path() {
        let path = BeatConfig::config_file_path().unwrap();
        assert!(path.to_string_lossy().contains("springbeat"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_client_id() {
        let mut mqtt = MqttConfig::default();
        assert_eq!(mqtt.client_id_or("web-01"), "springbeat-web-01");
        mqtt.client_id = Some("fixed".to_string());
        assert_eq!(mqtt.client_id_or("web-01"), "fixed");
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BeatConfig::load_from(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config, BeatConfig::default());
    }

    #[tokio::test]
    async fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
period_secs = 30
urls = ["http://orders:8081/", "https://billing.internal"]

[stats]
info = false

[mqtt]
broker_host = "mqtt.internal"
"#
        )
        .unwrap();

        let config = BeatConfig::load_from(file.path()).await.unwrap();
        assert_eq!(config.period_secs, 30);
        assert_eq!(config.urls.len(), 2);
        assert!(config.stats.metrics);
        assert!(!config.stats.info);
        assert_eq!(config.mqtt.broker_host, "mqtt.internal");
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.http.timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "period_secs = \"often\"").unwrap();
        assert!(BeatConfig::load_from(file.path()).await.is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = BeatConfig::default();
        config.period_secs = 0;
        assert!(config.validate().is_err());

        let mut config = BeatConfig::default();
        config.urls.clear();
        assert!(config.validate().is_err());

        let mut config = BeatConfig::default();
        config.urls = vec!["ftp://files:21".to_string()];
        assert!(config.validate().is_err());

        let mut config = BeatConfig::default();
        config.urls = vec!["not a url".to_string()];
        assert!(config.validate().is_err());

        let mut config = BeatConfig::default();
        config.stats = StatsConfig {
            metrics: false,
            health: false,
            info: false,
        };
        assert!(config.validate().is_err());
    }
}
