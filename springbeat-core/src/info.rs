//! `/health` and `/info` documents
//!
//! Plain fixed-schema decodes: no dynamic keys, missing fields default to
//! zero or empty, any decode failure fails the whole document.

use crate::decode::decode_object;
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// Body of the `/health` endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthStatus {
    /// Aggregated status (`UP`, `DOWN`, `OUT_OF_SERVICE`, `UNKNOWN`)
    pub status: String,
    pub disk_space: DiskSpaceHealth,
    pub db: DatabaseHealth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskSpaceHealth {
    pub status: String,
    pub total: u64,
    pub free: u64,
    pub threshold: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseHealth {
    pub status: String,
    pub database: String,
    /// Result of the validation query
    pub hello: u64,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}

/// Body of the `/info` endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationInfo {
    pub app: AppDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppDetails {
    pub id: String,
    pub name: String,
    pub port: String,
    pub environment: String,
}

pub fn decode_health(bytes: &[u8]) -> Result<HealthStatus, DecodeError> {
    decode_object(bytes)
}

pub fn decode_app_info(bytes: &[u8]) -> Result<ApplicationInfo, DecodeError> {
    decode_object(bytes)
}
