//! The two decode passes over a `/metrics` body
//!
//! `decode_fixed` keeps only the well-known keys, `scan_dynamic` keeps every
//! numeric key so the normalizer can discover the dynamic families. Both
//! reject the same inputs: anything that is not a single JSON object.

use crate::error::{DecodeError, Diagnostic, TypeMismatchError};
use crate::model::{GenericMetrics, RawFlatMetrics};
use crate::normalize::classify;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

type JsonObject = Map<String, Value>;

/// Decode a fixed-schema document (metrics, health or info body)
///
/// The body must be a JSON object. A key repeated in the body keeps its last
/// value, the same as in `scan_dynamic`.
pub(crate) fn decode_object<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let object = parse_object(bytes)?;

    match serde_json::from_slice(bytes) {
        Ok(decoded) => Ok(decoded),
        // derived structs reject repeated fields, the parsed map already kept the last one
        Err(e) => serde_json::from_value(Value::Object(object)).map_err(|_| DecodeError::new(e, bytes)),
    }
}

fn parse_object(bytes: &[u8]) -> Result<JsonObject, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError::new(e, bytes))
}

/// Fixed-schema pass: unknown keys ignored, absent keys zeroed
pub fn decode_fixed(bytes: &[u8]) -> Result<RawFlatMetrics, DecodeError> {
    decode_object(bytes)
}

/// Generic pass: every numeric top-level key, plus a mismatch for each
/// dynamic key whose value is not a number
pub fn scan_dynamic(bytes: &[u8]) -> Result<(GenericMetrics, Vec<Diagnostic>), DecodeError> {
    let object = parse_object(bytes)?;

    let mut generic = GenericMetrics::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for (key, value) in object {
        match value.as_f64() {
            Some(number) => {
                generic.insert(key, number);
            }
            None if classify(&key).is_dynamic() => {
                debug!(key = %key, "dynamic metric is not numeric");
                diagnostics.push(
                    TypeMismatchError {
                        key,
                        found: json_kind(&value),
                    }
                    .into(),
                );
            }
            None => {}
        }
    }

    // serde_json may be built with `preserve_order`
    diagnostics.sort_by(|a, b| a.key().cmp(b.key()));

    Ok((generic, diagnostics))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
