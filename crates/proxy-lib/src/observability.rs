//! Observability infrastructure for the prediction proxy
//!
//! Provides:
//! - Prometheus metrics (request outcomes, upstream latency, last confidence)
//! - Structured JSON logging with tracing

use crate::error::{ProxyError, Stage};
use prometheus::{
    register_gauge, register_histogram_vec, register_int_counter_vec, Gauge, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for upstream call latency (in seconds)
const UPSTREAM_LATENCY_BUCKETS: &[f64] = &[
    0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ProxyMetricsInner> = OnceLock::new();

struct ProxyMetricsInner {
    requests_total: IntCounterVec,
    upstream_latency_seconds: HistogramVec,
    last_confidence: Gauge,
}

impl ProxyMetricsInner {
    fn new() -> Self {
        Self {
            requests_total: register_int_counter_vec!(
                "wml_proxy_requests_total",
                "Prediction requests handled, by outcome",
                &["outcome"]
            )
            .expect("Failed to register requests_total"),

            upstream_latency_seconds: register_histogram_vec!(
                "wml_proxy_upstream_latency_seconds",
                "Latency of outbound IAM and WML calls",
                &["stage"],
                UPSTREAM_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register upstream_latency_seconds"),

            last_confidence: register_gauge!(
                "wml_proxy_last_confidence",
                "Confidence of the most recent successful prediction"
            )
            .expect("Failed to register last_confidence"),
        }
    }
}

/// Proxy metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the same
/// underlying metrics.
#[derive(Clone)]
pub struct ProxyMetrics {
    _private: (),
}

impl Default for ProxyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ProxyMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ProxyMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn inc_success(&self) {
        self.inner()
            .requests_total
            .with_label_values(&["success"])
            .inc();
    }

    pub fn inc_failure(&self, err: &ProxyError) {
        self.inner()
            .requests_total
            .with_label_values(&[err.kind()])
            .inc();
    }

    pub fn observe_upstream_latency(&self, stage: Stage, duration_secs: f64) {
        self.inner()
            .upstream_latency_seconds
            .with_label_values(&[stage.as_str()])
            .observe(duration_secs);
    }

    pub fn set_last_confidence(&self, confidence: f64) {
        self.inner().last_confidence.set(confidence);
    }
}

/// Structured logger for proxy events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log a prediction returned to the caller
    pub fn log_prediction(&self, prediction: &str, confidence: f64, elapsed_ms: u128) {
        info!(
            event = "prediction_served",
            service = %self.service,
            prediction = %prediction,
            confidence = confidence,
            elapsed_ms = elapsed_ms as u64,
            "Prediction served"
        );
    }

    /// Log a request that ended in an error
    pub fn log_failure(&self, err: &ProxyError) {
        match err {
            ProxyError::MethodNotAllowed | ProxyError::InvalidRequest(_) => {
                info!(
                    event = "request_rejected",
                    service = %self.service,
                    kind = err.kind(),
                    message = %err,
                    "Request rejected"
                );
            }
            ProxyError::ServerMisconfigured => {
                error!(
                    event = "server_misconfigured",
                    service = %self.service,
                    "Server configuration error: WML credentials not set"
                );
            }
            _ => {
                warn!(
                    event = "upstream_failure",
                    service = %self.service,
                    kind = err.kind(),
                    message = %err,
                    "Prediction request failed"
                );
            }
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, listen_addr: &str, configured: bool) {
        info!(
            event = "startup",
            service = %self.service,
            version = %version,
            listen_addr = %listen_addr,
            credentials_configured = configured,
            "Prediction proxy starting"
        );
    }

    /// Log missing credentials detected at startup
    pub fn log_missing_credentials(&self, missing: &[&str]) {
        warn!(
            event = "credentials_missing",
            service = %self.service,
            missing = ?missing,
            "WML credentials not set; /api/predict will fail until configured"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "shutdown",
            service = %self.service,
            reason = %reason,
            "Prediction proxy shutting down"
        );
    }
}
