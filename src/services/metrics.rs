//! Prometheus metrics for ask-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Registry plus every collector, built as one unit so concurrent
/// initialization cannot end up with a collector missing from the registry.
struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    answer_requests_total: IntCounterVec,
    answer_provider_latency_seconds: HistogramVec,
    answer_provider_errors_total: IntCounterVec,
    logins_total: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new() -> Self {
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let answer_requests_total = IntCounterVec::new(
            Opts::new("answer_requests_total", "Total answered questions"),
            &["model", "outcome"],
        )
        .expect("metric can be created");

        let answer_provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "answer_provider_latency_seconds",
                "Answer provider API latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["provider", "model"],
        )
        .expect("metric can be created");

        let answer_provider_errors_total = IntCounterVec::new(
            Opts::new(
                "answer_provider_errors_total",
                "Total answer provider errors",
            ),
            &["provider", "error_type"],
        )
        .expect("metric can be created");

        let logins_total = IntCounterVec::new(
            Opts::new("logins_total", "Login attempts by outcome"),
            &["outcome"],
        )
        .expect("metric can be created");

        let registry = Registry::new();
        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(answer_requests_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(answer_provider_latency_seconds.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(answer_provider_errors_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(logins_total.clone()))
            .expect("collector can be registered");

        Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            answer_requests_total,
            answer_provider_latency_seconds,
            answer_provider_errors_total,
            logins_total,
        }
    }
}

/// Initialize all metrics. Safe to call more than once; the registry and its
/// collectors are built exactly once.
pub fn init_metrics() {
    let _ = METRICS.get_or_init(Metrics::new);
    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let metrics = match METRICS.get() {
        Some(m) => m,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = metrics.registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record a completed HTTP request.
pub fn record_http_request(method: &str, path: &str, status: &str, duration_secs: f64) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .http_requests_total
            .with_label_values(&[method, path, status])
            .inc();
        metrics
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}

/// Record an answered (or failed) question.
pub fn record_answer_request(model: &str, outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .answer_requests_total
            .with_label_values(&[model, outcome])
            .inc();
    }
}

/// Record answer provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .answer_provider_latency_seconds
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record an answer provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .answer_provider_errors_total
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

/// Record a login attempt outcome.
pub fn record_login(outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .logins_total
            .with_label_values(&[outcome])
            .inc();
    }
}
