//! Key classification and normalization of `/metrics` payloads
//!
//! Dynamic key grammar (separator `.`, rewritten to `_` in map keys):
//! - `counter.status.<group>.<endpoint...>` -> `status_count[group][endpoint]`
//! - `gauge.response.<endpoint...>`         -> `response_time[endpoint]`
//!
//! Keys outside the fixed schema and both families are dropped silently.
//! When two raw keys rewrite to the same map key, the one sorting last wins.

use crate::decode::{decode_fixed, scan_dynamic};
use crate::error::{DecodeError, Diagnostic, SchemaViolationError};
use crate::model::{GenericMetrics, NormalizedMetrics, RawFlatMetrics};
use serde::Serialize;
use tracing::debug;

pub const STATUS_COUNT_PREFIX: &str = "counter.status.";
pub const RESPONSE_TIME_PREFIX: &str = "gauge.response.";

const SEPARATOR: char = '.';
const REPLACEMENT: &str = "_";

/// Where a payload key belongs in the normalized model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyClass {
    /// Owned by `RawFlatMetrics`
    Fixed,
    StatusCount { group: String, name: String },
    ResponseTime { name: String },
    /// Dynamic family prefix with an unusable suffix
    Malformed { reason: &'static str },
    Unrecognized,
}

impl KeyClass {
    /// Keys whose values must be numbers for the snapshot to be complete
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            KeyClass::StatusCount { .. } | KeyClass::ResponseTime { .. } | KeyClass::Malformed { .. }
        )
    }
}

pub fn classify(key: &str) -> KeyClass {
    if RawFlatMetrics::is_fixed_key(key) {
        return KeyClass::Fixed;
    }

    if let Some(suffix) = key.strip_prefix(STATUS_COUNT_PREFIX) {
        return match suffix.split_once(SEPARATOR) {
            None => KeyClass::Malformed {
                reason: "missing endpoint after status group",
            },
            Some(("", _)) => KeyClass::Malformed {
                reason: "empty status group",
            },
            Some((_, "")) => KeyClass::Malformed {
                reason: "empty endpoint name",
            },
            Some((group, endpoint)) => KeyClass::StatusCount {
                group: group.to_string(),
                name: rewrite(endpoint),
            },
        };
    }

    if let Some(suffix) = key.strip_prefix(RESPONSE_TIME_PREFIX) {
        if suffix.is_empty() {
            return KeyClass::Malformed {
                reason: "empty endpoint name",
            };
        }
        return KeyClass::ResponseTime {
            name: rewrite(suffix),
        };
    }

    KeyClass::Unrecognized
}

fn rewrite(path: &str) -> String {
    path.replace(SEPARATOR, REPLACEMENT)
}

/// Best-effort snapshot plus the anomalies met while building it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub metrics: NormalizedMetrics,
    pub diagnostics: Vec<Diagnostic>,
}

impl Normalized {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Normalize one `/metrics` body
///
/// Fails only when the body is not a decodable JSON object; per-key problems
/// end up in `Normalized::diagnostics`.
pub fn normalize(bytes: &[u8]) -> Result<Normalized, DecodeError> {
    let (generic, mut diagnostics) = scan_dynamic(bytes)?;
    let raw = decode_fixed(bytes)?;

    let mut metrics = NormalizedMetrics::from(raw);
    diagnostics.extend(merge_dynamic(&mut metrics, &generic));

    Ok(Normalized {
        metrics,
        diagnostics,
    })
}

/// Fold the dynamic families of `generic` into `metrics`
pub fn merge_dynamic(metrics: &mut NormalizedMetrics, generic: &GenericMetrics) -> Vec<Diagnostic> {
    let mut violations = Vec::new();

    for (key, &value) in generic {
        match classify(key) {
            KeyClass::Fixed => {}
            KeyClass::StatusCount { group, name } => {
                let endpoints = metrics.status_count.entry(group).or_default();
                if let Some(previous) = endpoints.insert(name, value) {
                    debug!(key = %key, previous, "status counter collision, keeping latest");
                }
            }
            KeyClass::ResponseTime { name } => {
                if let Some(previous) = metrics.response_time.insert(name, value) {
                    debug!(key = %key, previous, "response gauge collision, keeping latest");
                }
            }
            KeyClass::Malformed { reason } => {
                violations.push(
                    SchemaViolationError {
                        key: key.clone(),
                        reason,
                    }
                    .into(),
                );
            }
            KeyClass::Unrecognized => {
                debug!(key = %key, "dropping metric outside known families");
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeMismatchError;
    use std::collections::BTreeMap;

    fn endpoints(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_classify_families() {
        assert_eq!(classify("heap.used"), KeyClass::Fixed);
        assert_eq!(
            classify("counter.status.200.root"),
            KeyClass::StatusCount {
                group: "200".into(),
                name: "root".into()
            }
        );
        assert_eq!(
            classify("counter.status.404.api.v2.users"),
            KeyClass::StatusCount {
                group: "404".into(),
                name: "api_v2_users".into()
            }
        );
        assert_eq!(
            classify("gauge.response.star-star.favicon.ico"),
            KeyClass::ResponseTime {
                name: "star-star_favicon_ico".into()
            }
        );
        assert_eq!(classify("timer.foo.bar"), KeyClass::Unrecognized);
        assert_eq!(classify("counter.status"), KeyClass::Unrecognized);
        assert_eq!(classify("gauge.responses.root"), KeyClass::Unrecognized);
    }

    #[test]
    fn test_classify_malformed_suffixes() {
        for key in [
            "counter.status.200",
            "counter.status.",
            "counter.status..root",
            "counter.status.200.",
            "gauge.response.",
        ] {
            let class = classify(key);
            assert!(matches!(class, KeyClass::Malformed { .. }), "{key}: {class:?}");
            assert!(class.is_dynamic());
        }
        assert!(!classify("mem").is_dynamic());
        assert!(!classify("timer.foo").is_dynamic());
    }

    #[test]
    fn test_fixed_only_payload() {
        let result = normalize(
            br#"{
                "mem": 4096, "mem.free": 1024, "processors": 8,
                "systemload.average": 1.5, "uptime": 90000, "instance.uptime": 80000,
                "threads": 30, "threads.totalStarted": 41,
                "gc.ps_scavenge.count": 12, "httpsessions.max": -1,
                "datasource.primary.usage": 0.5
            }"#,
        )
        .unwrap();

        assert!(result.is_clean());
        let metrics = result.metrics;
        assert!(metrics.response_time.is_empty());
        assert!(metrics.status_count.is_empty());
        assert_eq!(metrics.mem.total, 4096);
        assert_eq!(metrics.mem.free, 1024);
        assert_eq!(metrics.processors, 8);
        assert_eq!(metrics.load_average, 1.5);
        assert_eq!(metrics.uptime.total, 90000);
        assert_eq!(metrics.uptime.instance, 80000);
        assert_eq!(metrics.threads.started, 41);
        assert_eq!(metrics.gc.scavenge.count, 12);
        assert_eq!(metrics.http.max_sessions, -1);
        assert_eq!(metrics.data_source.primary_usage, 0.5);
        assert_eq!(metrics.heap.used, 0);
        assert_eq!(metrics.classes.total, 0);
    }

    #[test]
    fn test_status_counter() {
        let result = normalize(br#"{"counter.status.200.root": 12.0}"#).unwrap();
        assert!(result.is_clean());
        assert_eq!(
            result.metrics.status_count,
            BTreeMap::from([("200".to_string(), endpoints(&[("root", 12.0)]))])
        );
        assert!(result.metrics.response_time.is_empty());
    }

    #[test]
    fn test_status_counter_nested_path() {
        let result = normalize(br#"{"counter.status.404.api.v2.users": 3.0}"#).unwrap();
        assert_eq!(
            result.metrics.status_count,
            BTreeMap::from([("404".to_string(), endpoints(&[("api_v2_users", 3.0)]))])
        );
    }

    #[test]
    fn test_status_groups_share_outer_key() {
        let result = normalize(
            br#"{
                "counter.status.200.root": 5,
                "counter.status.200.health": 2,
                "counter.status.500.api.orders": 1
            }"#,
        )
        .unwrap();

        let status = &result.metrics.status_count;
        assert_eq!(status.len(), 2);
        assert_eq!(status["200"], endpoints(&[("health", 2.0), ("root", 5.0)]));
        assert_eq!(status["500"], endpoints(&[("api_orders", 1.0)]));
    }

    #[test]
    fn test_response_gauge() {
        let result = normalize(br#"{"gauge.response.root": 0.042}"#).unwrap();
        assert_eq!(result.metrics.response_time, endpoints(&[("root", 0.042)]));
        assert!(result.metrics.status_count.is_empty());
    }

    #[test]
    fn test_unknown_prefix_dropped() {
        let result = normalize(br#"{"timer.foo.bar": 1.0, "gauge.response.root": 2.0}"#).unwrap();
        assert!(result.is_clean());
        assert_eq!(result.metrics.response_time, endpoints(&[("root", 2.0)]));

        let json = serde_json::to_string(&result.metrics).unwrap();
        assert!(!json.contains("timer"));
        assert!(!json.contains("foo"));
    }

    #[test]
    fn test_non_numeric_dynamic_value() {
        let result = normalize(
            br#"{
                "gauge.response.root": "bad",
                "gauge.response.health": 0.003,
                "counter.status.200.health": 9,
                "mem": 100
            }"#,
        )
        .unwrap();

        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::TypeMismatch(TypeMismatchError {
                key: "gauge.response.root".into(),
                found: "string",
            })]
        );
        assert_eq!(result.metrics.response_time, endpoints(&[("health", 0.003)]));
        assert_eq!(result.metrics.status_count["200"], endpoints(&[("health", 9.0)]));
        assert_eq!(result.metrics.mem.total, 100);
    }

    #[test]
    fn test_status_without_endpoint() {
        let result = normalize(br#"{"counter.status.200": 4, "counter.status.201.created": 1}"#).unwrap();

        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::SchemaViolation(SchemaViolationError {
                key: "counter.status.200".into(),
                reason: "missing endpoint after status group",
            })]
        );
        assert!(!result.metrics.status_count.contains_key("200"));
        assert_eq!(result.metrics.status_count["201"], endpoints(&[("created", 1.0)]));
    }

    #[test]
    fn test_mismatch_and_violation_reported_together() {
        let result = normalize(br#"{"counter.status.200": "x", "gauge.response.": 1}"#).unwrap();
        assert_eq!(result.diagnostics.len(), 2);
        assert!(matches!(result.diagnostics[0], Diagnostic::TypeMismatch(_)));
        assert!(matches!(result.diagnostics[1], Diagnostic::SchemaViolation(_)));
    }

    #[test]
    fn test_collision_last_key_wins() {
        // "api.v1" and "api_v1" both rewrite to "api_v1"; "api_v1" sorts last
        let result = normalize(
            br#"{
                "gauge.response.api_v1": 2.0,
                "gauge.response.api.v1": 1.0,
                "counter.status.200.api_v1": 20,
                "counter.status.200.api.v1": 10
            }"#,
        )
        .unwrap();

        assert!(result.is_clean());
        assert_eq!(result.metrics.response_time, endpoints(&[("api_v1", 2.0)]));
        assert_eq!(result.metrics.status_count["200"], endpoints(&[("api_v1", 20.0)]));
    }

    #[test]
    fn test_idempotent() {
        let payload = br#"{
            "mem": 10, "heap.used": 3,
            "counter.status.200.root": 1, "counter.status.302.login": 4,
            "gauge.response.root": 0.2, "gauge.response.login": 0.9,
            "gauge.response.bad": [], "counter.status.404": 1
        }"#;

        let first = normalize(payload).unwrap();
        let second = normalize(payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_payload() {
        let payloads: [&[u8]; 4] = [b"{\"mem\": 1", b"[1, 2, 3]", b"not json", b"null"];
        for payload in payloads {
            assert!(normalize(payload).is_err());
        }
    }

    #[test]
    fn test_fixed_key_wrong_type_is_fatal() {
        let err = normalize(br#"{"mem": "big", "gauge.response.root": 1}"#).unwrap_err();
        assert!(err.to_string().contains("invalid actuator payload"));
    }

    #[test]
    fn test_repeated_and_null_keys_are_accepted() {
        let result = normalize(
            br#"{"mem": 1, "mem": 2, "heap": null,
                "counter.status.200.root": 3, "counter.status.200.root": 7}"#,
        )
        .unwrap();

        assert!(result.is_clean());
        assert_eq!(result.metrics.mem.total, 2);
        assert_eq!(result.metrics.heap.total, 0);
        assert_eq!(result.metrics.status_count["200"], endpoints(&[("root", 7.0)]));
    }

    #[test]
    fn test_fixed_and_dynamic_disjoint() {
        let result = normalize(br#"{"heap": 5, "gauge.response.heap": 0.1}"#).unwrap();
        assert_eq!(result.metrics.heap.total, 5);
        assert_eq!(result.metrics.response_time, endpoints(&[("heap", 0.1)]));
    }
}
