//! Prometheus metrics for chatbot-service.
//!
//! HTTP request metrics come from the `metrics` facade (see
//! `service_core::middleware::metrics`) through the Prometheus recorder;
//! prediction metrics live in a dedicated `prometheus` registry. Both are
//! rendered together by [`get_metrics`].

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static PREDICTIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static RESPONDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize all metrics. Subsequent calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
        }
    }

    let registry = Registry::new();

    let predictions = IntCounterVec::new(
        Opts::new("chatbot_predictions_total", "Total prediction requests by outcome"),
        &["responder", "outcome"],
    )
    .expect("Failed to create chatbot_predictions_total metric");

    let latency = HistogramVec::new(
        HistogramOpts::new(
            "chatbot_responder_latency_seconds",
            "Responder latency in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["responder"],
    )
    .expect("Failed to create chatbot_responder_latency_seconds metric");

    registry
        .register(Box::new(predictions.clone()))
        .expect("Failed to register chatbot_predictions_total");
    registry
        .register(Box::new(latency.clone()))
        .expect("Failed to register chatbot_responder_latency_seconds");

    let _ = PROMETHEUS_REGISTRY.set(registry);
    let _ = PREDICTIONS_TOTAL.set(predictions);
    let _ = RESPONDER_LATENCY_SECONDS.set(latency);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "Failed to encode metrics");
            return output;
        }
        match String::from_utf8(buffer) {
            Ok(custom) => output.push_str(&custom),
            Err(e) => tracing::error!(error = %e, "Failed to convert metrics to UTF-8"),
        }
    }

    output
}

/// Record the outcome of a prediction (`ok` or an error kind).
pub fn record_prediction(responder: &str, outcome: &str) {
    if let Some(counter) = PREDICTIONS_TOTAL.get() {
        counter.with_label_values(&[responder, outcome]).inc();
    }
}

pub fn record_responder_latency(responder: &str, duration_secs: f64) {
    if let Some(histogram) = RESPONDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[responder])
            .observe(duration_secs);
    }
}
