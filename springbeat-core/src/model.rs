//! Statistics model for actuator `/metrics` snapshots
//!
//! `RawFlatMetrics` mirrors the flat payload key by key, `NormalizedMetrics`
//! is the nested shape handed to publishers.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Every numeric top-level key of the payload, ordered by raw key
pub type GenericMetrics = BTreeMap<String, f64>;

/// Flat decode of the well-known actuator keys
///
/// Unknown keys are ignored, absent or `null` keys stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFlatMetrics {
    #[serde(rename = "mem", deserialize_with = "null_as_zero")]
    pub mem: u64,
    #[serde(rename = "mem.free", deserialize_with = "null_as_zero")]
    pub mem_free: u64,
    #[serde(rename = "processors", deserialize_with = "null_as_zero")]
    pub processors: u64,
    #[serde(rename = "instance.uptime", deserialize_with = "null_as_zero")]
    pub instance_uptime: u64,
    #[serde(rename = "uptime", deserialize_with = "null_as_zero")]
    pub uptime: u64,
    #[serde(rename = "systemload.average", deserialize_with = "null_as_zero")]
    pub systemload_average: f64,
    #[serde(rename = "heap.committed", deserialize_with = "null_as_zero")]
    pub heap_committed: u64,
    #[serde(rename = "heap.init", deserialize_with = "null_as_zero")]
    pub heap_init: u64,
    #[serde(rename = "heap.used", deserialize_with = "null_as_zero")]
    pub heap_used: u64,
    #[serde(rename = "heap", deserialize_with = "null_as_zero")]
    pub heap: u64,
    #[serde(rename = "nonheap.committed", deserialize_with = "null_as_zero")]
    pub nonheap_committed: u64,
    #[serde(rename = "nonheap.init", deserialize_with = "null_as_zero")]
    pub nonheap_init: u64,
    #[serde(rename = "nonheap.used", deserialize_with = "null_as_zero")]
    pub nonheap_used: u64,
    #[serde(rename = "nonheap", deserialize_with = "null_as_zero")]
    pub nonheap: u64,
    #[serde(rename = "threads.peak", deserialize_with = "null_as_zero")]
    pub threads_peak: u64,
    #[serde(rename = "threads.daemon", deserialize_with = "null_as_zero")]
    pub threads_daemon: u64,
    #[serde(rename = "threads.totalStarted", deserialize_with = "null_as_zero")]
    pub threads_total_started: u64,
    #[serde(rename = "threads", deserialize_with = "null_as_zero")]
    pub threads: u64,
    #[serde(rename = "classes", deserialize_with = "null_as_zero")]
    pub classes: u64,
    #[serde(rename = "classes.loaded", deserialize_with = "null_as_zero")]
    pub classes_loaded: u64,
    #[serde(rename = "classes.unloaded", deserialize_with = "null_as_zero")]
    pub classes_unloaded: u64,
    #[serde(rename = "gc.ps_scavenge.count", deserialize_with = "null_as_zero")]
    pub gc_scavenge_count: u64,
    #[serde(rename = "gc.ps_scavenge.time", deserialize_with = "null_as_zero")]
    pub gc_scavenge_time: u64,
    #[serde(rename = "gc.ps_marksweep.count", deserialize_with = "null_as_zero")]
    pub gc_marksweep_count: u64,
    #[serde(rename = "gc.ps_marksweep.time", deserialize_with = "null_as_zero")]
    pub gc_marksweep_time: u64,
    /// `-1` means unlimited
    #[serde(rename = "httpsessions.max", deserialize_with = "null_as_zero")]
    pub http_sessions_max: i64,
    #[serde(rename = "httpsessions.active", deserialize_with = "null_as_zero")]
    pub http_sessions_active: u64,
    #[serde(rename = "datasource.primary.active", deserialize_with = "null_as_zero")]
    pub datasource_primary_active: u64,
    #[serde(rename = "datasource.primary.usage", deserialize_with = "null_as_zero")]
    pub datasource_primary_usage: f64,
}

fn null_as_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawFlatMetrics {
    /// Payload keys owned by the fixed schema (must match the serde renames above)
    pub const KEYS: &'static [&'static str] = &[
        "mem",
        "mem.free",
        "processors",
        "instance.uptime",
        "uptime",
        "systemload.average",
        "heap.committed",
        "heap.init",
        "heap.used",
        "heap",
        "nonheap.committed",
        "nonheap.init",
        "nonheap.used",
        "nonheap",
        "threads.peak",
        "threads.daemon",
        "threads.totalStarted",
        "threads",
        "classes",
        "classes.loaded",
        "classes.unloaded",
        "gc.ps_scavenge.count",
        "gc.ps_scavenge.time",
        "gc.ps_marksweep.count",
        "gc.ps_marksweep.time",
        "httpsessions.max",
        "httpsessions.active",
        "datasource.primary.active",
        "datasource.primary.usage",
    ];

    pub fn is_fixed_key(key: &str) -> bool {
        Self::KEYS.contains(&key)
    }
}

/// Nested statistics for one `/metrics` snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    pub mem: Memory,
    pub processors: u64,
    pub load_average: f64,
    pub uptime: Uptime,
    pub heap: MemoryPool,
    pub non_heap: MemoryPool,
    pub threads: Threads,
    pub classes: Classes,
    pub gc: GarbageCollection,
    pub http: HttpSessions,
    pub data_source: DataSource,
    /// endpoint -> latest response time
    pub response_time: BTreeMap<String, f64>,
    /// status group -> endpoint -> hit count
    pub status_count: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub total: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uptime {
    pub total: u64,
    pub instance: u64,
}

/// Heap or non-heap usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPool {
    pub total: u64,
    pub committed: u64,
    pub init: u64,
    pub used: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threads {
    pub total: u64,
    pub started: u64,
    pub peak: u64,
    pub daemon: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classes {
    pub total: u64,
    pub loaded: u64,
    pub unloaded: u64,
}

/// Count and accumulated time (ms) of one collector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collector {
    pub count: u64,
    pub time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbageCollection {
    pub scavenge: Collector,
    pub marksweep: Collector,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSessions {
    pub max_sessions: i64,
    pub active_sessions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub primary_active: u64,
    pub primary_usage: f64,
}

impl From<RawFlatMetrics> for NormalizedMetrics {
    fn from(raw: RawFlatMetrics) -> Self {
        Self {
            mem: Memory {
                total: raw.mem,
                free: raw.mem_free,
            },
            processors: raw.processors,
            load_average: raw.systemload_average,
            uptime: Uptime {
                total: raw.uptime,
                instance: raw.instance_uptime,
            },
            heap: MemoryPool {
                total: raw.heap,
                committed: raw.heap_committed,
                init: raw.heap_init,
                used: raw.heap_used,
            },
            non_heap: MemoryPool {
                total: raw.nonheap,
                committed: raw.nonheap_committed,
                init: raw.nonheap_init,
                used: raw.nonheap_used,
            },
            threads: Threads {
                total: raw.threads,
                started: raw.threads_total_started,
                peak: raw.threads_peak,
                daemon: raw.threads_daemon,
            },
            classes: Classes {
                total: raw.classes,
                loaded: raw.classes_loaded,
                unloaded: raw.classes_unloaded,
            },
            gc: GarbageCollection {
                scavenge: Collector {
                    count: raw.gc_scavenge_count,
                    time: raw.gc_scavenge_time,
                },
                marksweep: Collector {
                    count: raw.gc_marksweep_count,
                    time: raw.gc_marksweep_time,
                },
            },
            http: HttpSessions {
                max_sessions: raw.http_sessions_max,
                active_sessions: raw.http_sessions_active,
            },
            data_source: DataSource {
                primary_active: raw.datasource_primary_active,
                primary_usage: raw.datasource_primary_usage,
            },
            response_time: BTreeMap::new(),
            status_count: BTreeMap::new(),
        }
    }
}
