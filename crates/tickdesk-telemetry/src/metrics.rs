//! Prometheus metrics for tickdesk.
//!
//! Covers the event log, the HTTP coordinator, and the refresh cycle.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent
//! failure. These panics only occur during static initialization, never at
//! runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

/// Log records appended, by level.
pub static EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tickdesk_log_events_total",
        "Total log records appended",
        &["level"]
    )
    .unwrap()
});

/// Compact status line updates.
pub static STATUS_UPDATES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tickdesk_status_updates_total",
        "Total compact status line updates"
    )
    .unwrap()
});

/// Records suppressed by the dedupe window.
pub static DEDUPE_SUPPRESSED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tickdesk_log_dedupe_suppressed_total",
        "Total reports suppressed by the dedupe window"
    )
    .unwrap()
});

/// Outbound HTTP requests, by endpoint and outcome.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tickdesk_http_requests_total",
        "Total outbound HTTP requests",
        &["endpoint", "status"]
    )
    .unwrap()
});

/// Outbound HTTP request latency in milliseconds.
pub static HTTP_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tickdesk_http_latency_ms",
        "Outbound HTTP request latency in milliseconds",
        &["endpoint"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0]
    )
    .unwrap()
});

/// Refresh cycles, by outcome (success/failure/suspended).
pub static REFRESH_CYCLES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tickdesk_refresh_cycles_total",
        "Total refresh cycles",
        &["outcome"]
    )
    .unwrap()
});
