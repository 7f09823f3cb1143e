/*!
Sample actuator bodies

Shaped after a Spring Boot 1.x application with a JDBC datasource, two
served endpoints and the favicon handler.
*/

use serde_json::{json, Value};

/// `/metrics` body: every fixed key plus a few dynamic families
pub fn metrics() -> Value {
    json!({
        "mem": 353_986,
        "mem.free": 161_970,
        "processors": 8,
        "instance.uptime": 92_417,
        "uptime": 97_660,
        "systemload.average": 1.43,
        "heap.committed": 297_472,
        "heap.init": 262_144,
        "heap.used": 192_016,
        "heap": 3_728_384,
        "nonheap.committed": 57_520,
        "nonheap.init": 2_496,
        "nonheap.used": 56_514,
        "nonheap": 0,
        "threads.peak": 24,
        "threads.daemon": 20,
        "threads.totalStarted": 28,
        "threads": 22,
        "classes": 6_858,
        "classes.loaded": 6_858,
        "classes.unloaded": 0,
        "gc.ps_scavenge.count": 8,
        "gc.ps_scavenge.time": 101,
        "gc.ps_marksweep.count": 2,
        "gc.ps_marksweep.time": 136,
        "httpsessions.max": -1,
        "httpsessions.active": 0,
        "datasource.primary.active": 0,
        "datasource.primary.usage": 0.0,
        "gauge.response.metrics": 3.0,
        "gauge.response.root": 12.0,
        "gauge.response.star-star.favicon.ico": 6.0,
        "counter.status.200.metrics": 4,
        "counter.status.200.root": 17,
        "counter.status.200.star-star.favicon.ico": 3,
        "counter.status.404.star-star": 1
    })
}

/// `/health` body with disk space and database indicators
pub fn health() -> Value {
    json!({
        "status": "UP",
        "diskSpace": {
            "status": "UP",
            "total": 250_685_575_168_u64,
            "free": 95_595_757_568_u64,
            "threshold": 10_485_760
        },
        "db": {
            "status": "UP",
            "database": "H2",
            "hello": 1
        }
    })
}

/// `/info` body
pub fn info() -> Value {
    json!({
        "app": {
            "id": "orders",
            "name": "orders-service",
            "port": "8081",
            "environment": "staging"
        }
    })
}
