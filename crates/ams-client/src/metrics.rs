//! Request metrics for Media Services calls.

use metrics::{counter, histogram};

/// Metric name constants.
pub mod names {
    /// Total requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "ams_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "ams_latency_seconds";
}

/// Record metrics for a completed request. `status` 0 means no HTTP status was seen.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}
