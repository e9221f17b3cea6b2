//! HTTP API: prediction endpoint, health checks and Prometheus metrics

use crate::error::{ProxyError, Stage};
use crate::health::{components, HealthRegistry};
use crate::models::{ErrorResponse, PredictionResult};
use crate::observability::{ProxyMetrics, StructuredLogger};
use crate::proxy::PredictionProxy;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Path of the prediction endpoint
pub const PREDICT_PATH: &str = "/api/predict";

/// Largest request body the prediction endpoint buffers
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<PredictionProxy>,
    pub health_registry: HealthRegistry,
    pub metrics: ProxyMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        proxy: Arc<PredictionProxy>,
        health_registry: HealthRegistry,
        metrics: ProxyMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            proxy,
            health_registry,
            metrics,
            logger,
        }
    }
}

/// Error boundary mapping a `ProxyError` to `{message}` with its status code
#[derive(Debug)]
pub struct ApiError(pub ProxyError);

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = self.0.to_string();

        if status.is_server_error() {
            error!(error = self.0.kind(), %message, "API error");
        } else {
            debug!(error = self.0.kind(), %message, "API client error");
        }

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Reflect an upstream outcome in the component health
async fn record_upstream_health(
    registry: &HealthRegistry,
    outcome: &Result<PredictionResult, ProxyError>,
) {
    match outcome {
        Ok(_) => {
            registry.set_healthy(components::TOKEN_ISSUER).await;
            registry.set_healthy(components::PREDICTION_CLIENT).await;
        }
        Err(
            err @ (ProxyError::AuthenticationFailed
            | ProxyError::UpstreamUnreachable {
                stage: Stage::Token,
                ..
            }),
        ) => {
            registry
                .set_degraded(components::TOKEN_ISSUER, err.to_string())
                .await;
        }
        Err(
            err @ (ProxyError::PredictionRequestFailed { .. }
            | ProxyError::InvalidUpstreamResponse
            | ProxyError::UpstreamUnreachable {
                stage: Stage::Prediction,
                ..
            }),
        ) => {
            registry.set_healthy(components::TOKEN_ISSUER).await;
            registry
                .set_degraded(components::PREDICTION_CLIENT, err.to_string())
                .await;
        }
        Err(_) => {}
    }
}

/// Prediction endpoint; accepts any method so the proxy can answer 405 itself
async fn predict(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let started = Instant::now();
    let outcome = match body {
        Ok(body) => state.proxy.handle(&method, &body).await,
        Err(rejection) => state.proxy.reject_body(&method, rejection.body_text()),
    };
    record_upstream_health(&state.health_registry, &outcome).await;

    match outcome {
        Ok(result) => {
            state.metrics.inc_success();
            state.metrics.set_last_confidence(result.confidence);
            state.logger.log_prediction(
                &result.prediction,
                result.confidence,
                started.elapsed().as_millis(),
            );
            Ok(Json(result))
        }
        Err(err) => {
            state.metrics.inc_failure(&err);
            state.logger.log_failure(&err);
            Err(err.into())
        }
    }
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = if health.status.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            PREDICT_PATH,
            any(predict).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
