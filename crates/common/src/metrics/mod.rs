//! Metrics and observability utilities
//!
//! Prometheus metrics through the `metrics` facade with standardized
//! naming conventions. The exporter is installed by the gateway.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ClassDesk metrics
pub const METRICS_PREFIX: &str = "classdesk";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Account metrics
    describe_counter!(
        format!("{}_signups_total", METRICS_PREFIX),
        Unit::Count,
        "Teacher accounts registered"
    );

    describe_counter!(
        format!("{}_logins_total", METRICS_PREFIX),
        Unit::Count,
        "Login attempts by outcome"
    );

    // Upload metrics
    describe_counter!(
        format!("{}_uploaded_files_total", METRICS_PREFIX),
        Unit::Count,
        "Assessment images stored"
    );

    describe_counter!(
        format!("{}_uploaded_bytes_total", METRICS_PREFIX),
        Unit::Bytes,
        "Bytes of assessment images stored"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

pub fn record_signup() {
    counter!(format!("{}_signups_total", METRICS_PREFIX)).increment(1);
}

pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "rejected" };

    counter!(
        format!("{}_logins_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_upload(files: usize, bytes: usize) {
    counter!(format!("{}_uploaded_files_total", METRICS_PREFIX)).increment(files as u64);
    counter!(format!("{}_uploaded_bytes_total", METRICS_PREFIX)).increment(bytes as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every call is a no-op and must not panic
        let metrics = RequestMetrics::start("GET", "/api/courses/{teacherId}");
        metrics.finish(404);
        record_signup();
        record_login(false);
        record_upload(2, 2048);
    }
}
