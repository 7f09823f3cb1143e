//! Springbeat core - actuator payload normalization
//!
//! Turns the flat JSON object served by an actuator `/metrics` endpoint into
//! a nested, strongly typed statistics model:
//! - Fixed-schema decoding of the well-known keys (memory, heap, threads, gc...)
//! - Discovery of dynamic key families (`counter.status.*`, `gauge.response.*`)
//! - Non-fatal diagnostics for malformed dynamic entries
//!
//! The `/health` and `/info` documents are plain fixed-schema decodes and are
//! exposed here so the agent shares one error type for every endpoint.

pub mod decode;
pub mod error;
pub mod info;
pub mod model;
pub mod normalize;

pub use decode::{decode_fixed, scan_dynamic};
pub use error::{DecodeError, Diagnostic, SchemaViolationError, TypeMismatchError};
pub use info::{decode_app_info, decode_health, ApplicationInfo, HealthStatus};
pub use model::{GenericMetrics, NormalizedMetrics, RawFlatMetrics};
pub use normalize::{classify, normalize, KeyClass, Normalized};
