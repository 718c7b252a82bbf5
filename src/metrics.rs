//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Session gate
    pub static ref GATE_DECISIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_gate_decisions_total", "Total number of session gate decisions"),
        &["decision"]
    ).expect("metric can be created");
    pub static ref LOGIN_ATTEMPTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_login_attempts_total", "Total number of login attempts"),
        &["outcome"]
    ).expect("metric can be created");

    // Upstream services
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_upstream_requests_total", "Total number of upstream API requests"),
        &["service", "operation", "outcome"]
    ).expect("metric can be created");
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "scout_upstream_request_duration_seconds",
            "Upstream API request duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["service", "operation"]
    ).expect("metric can be created");

    // Application
    pub static ref COMPETITOR_SEARCHES_TOTAL: IntCounter = IntCounter::new(
        "scout_competitor_searches_total",
        "Total number of competitor searches performed"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(GATE_DECISIONS_TOTAL.clone()))
        .expect("GATE_DECISIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(LOGIN_ATTEMPTS_TOTAL.clone()))
        .expect("LOGIN_ATTEMPTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))
        .expect("UPSTREAM_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()))
        .expect("UPSTREAM_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(COMPETITOR_SEARCHES_TOTAL.clone()))
        .expect("COMPETITOR_SEARCHES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Record the outcome and latency of one upstream call.
pub fn observe_upstream(service: &str, operation: &str, ok: bool, started: std::time::Instant) {
    let outcome = if ok { "ok" } else { "error" };
    UPSTREAM_REQUESTS_TOTAL
        .with_label_values(&[service, operation, outcome])
        .inc();
    UPSTREAM_REQUEST_DURATION_SECONDS
        .with_label_values(&[service, operation])
        .observe(started.elapsed().as_secs_f64());
}
