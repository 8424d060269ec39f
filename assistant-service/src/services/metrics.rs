//! Prometheus metrics for the assistant service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Chat requests by outcome (success or error category).
pub static CHAT_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// End-to-end chat request duration.
pub static CHAT_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

/// Remote provider latency, labelled by provider.
pub static PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

/// Provider faults by origin and fault kind.
pub static PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Generation tokens by direction.
pub static TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Failed audit writes. Audit failures never fail the request, so this
/// counter is the operational signal that the trail is broken.
pub static AUDIT_LOG_FAILURES_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once; only the first
/// call registers anything.
pub fn init_metrics() {
    if REGISTRY.get().is_some() {
        return;
    }

    let registry = Registry::new();

    let chat_requests = IntCounterVec::new(
        Opts::new(
            "assistant_chat_requests_total",
            "Total chat requests by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create assistant_chat_requests_total metric");

    let chat_duration = HistogramVec::new(
        HistogramOpts::new(
            "assistant_chat_request_duration_seconds",
            "Chat request duration in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["outcome"],
    )
    .expect("Failed to create assistant_chat_request_duration_seconds metric");

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "assistant_provider_latency_seconds",
            "Remote provider latency in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["provider"],
    )
    .expect("Failed to create assistant_provider_latency_seconds metric");

    let provider_errors = IntCounterVec::new(
        Opts::new(
            "assistant_provider_errors_total",
            "Total provider faults by origin and kind",
        ),
        &["provider", "error_type"],
    )
    .expect("Failed to create assistant_provider_errors_total metric");

    let tokens = IntCounterVec::new(
        Opts::new("assistant_tokens_total", "Generation tokens by direction"),
        &["type"],
    )
    .expect("Failed to create assistant_tokens_total metric");

    let audit_failures = IntCounter::new(
        "assistant_audit_log_failures_total",
        "Total failed audit log writes",
    )
    .expect("Failed to create assistant_audit_log_failures_total metric");

    registry
        .register(Box::new(chat_requests.clone()))
        .expect("Failed to register assistant_chat_requests_total");
    registry
        .register(Box::new(chat_duration.clone()))
        .expect("Failed to register assistant_chat_request_duration_seconds");
    registry
        .register(Box::new(provider_latency.clone()))
        .expect("Failed to register assistant_provider_latency_seconds");
    registry
        .register(Box::new(provider_errors.clone()))
        .expect("Failed to register assistant_provider_errors_total");
    registry
        .register(Box::new(tokens.clone()))
        .expect("Failed to register assistant_tokens_total");
    registry
        .register(Box::new(audit_failures.clone()))
        .expect("Failed to register assistant_audit_log_failures_total");

    let _ = REGISTRY.set(registry);
    let _ = CHAT_REQUESTS_TOTAL.set(chat_requests);
    let _ = CHAT_REQUEST_DURATION_SECONDS.set(chat_duration);
    let _ = PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = TOKENS_TOTAL.set(tokens);
    let _ = AUDIT_LOG_FAILURES_TOTAL.set(audit_failures);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

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

/// Record a completed chat request.
pub fn record_chat_request(outcome: &str, duration_secs: f64) {
    if let Some(counter) = CHAT_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
    if let Some(histogram) = CHAT_REQUEST_DURATION_SECONDS.get() {
        histogram.with_label_values(&[outcome]).observe(duration_secs);
    }
}

/// Record remote provider latency.
pub fn record_provider_latency(provider: &str, duration_secs: f64) {
    if let Some(histogram) = PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider])
            .observe(duration_secs);
    }
}

/// Record a provider fault.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}

/// Record generation token usage.
pub fn record_tokens(input_tokens: i64, output_tokens: i64) {
    if let Some(counter) = TOKENS_TOTAL.get() {
        counter
            .with_label_values(&["input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&["output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

/// Record a failed audit write.
pub fn record_audit_failure() {
    if let Some(counter) = AUDIT_LOG_FAILURES_TOTAL.get() {
        counter.inc();
    }
}
