//! Prediction proxy: method guard, authentication, shaping, scoring, extraction

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result, Stage};
use crate::models::PredictionResult;
use crate::observability::ProxyMetrics;
use crate::payload::{InboundRequest, PayloadShaper};
use crate::scoring::{extract_result, PredictionClient, WmlPredictionClient};
use crate::token::{IamTokenIssuer, TokenIssuer};
use anyhow::Context;
use axum::http::Method;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Forwards sensor readings to the WML deployment
///
/// Holds only read-only configuration and shared collaborators, so a single
/// instance serves concurrent requests without locking.
pub struct PredictionProxy {
    config: ProxyConfig,
    shaper: PayloadShaper,
    token_issuer: Arc<dyn TokenIssuer>,
    prediction_client: Arc<dyn PredictionClient>,
    metrics: ProxyMetrics,
}

impl PredictionProxy {
    pub fn new(
        config: ProxyConfig,
        token_issuer: Arc<dyn TokenIssuer>,
        prediction_client: Arc<dyn PredictionClient>,
    ) -> Self {
        let shaper = PayloadShaper::new(config.target_placeholder.clone());
        Self {
            config,
            shaper,
            token_issuer,
            prediction_client,
            metrics: ProxyMetrics::new(),
        }
    }

    /// Build a proxy backed by the IAM and WML HTTP clients
    pub fn from_config(config: ProxyConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let token_issuer = Arc::new(IamTokenIssuer::new(
            client.clone(),
            config.iam_token_url.clone(),
        ));
        let prediction_client = Arc::new(WmlPredictionClient::new(client));

        Ok(Self::new(config, token_issuer, prediction_client))
    }

    /// Handle one inbound call
    ///
    /// Method and configuration are checked, and the body resolved, before any
    /// network I/O. The token call always precedes the prediction call.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> Result<PredictionResult> {
        let (api_key, endpoint_url) = self.admit(method)?;

        let request = InboundRequest::from_body(body)?;
        debug!(input_shape = request.kind(), "Resolved request body");

        let started = Instant::now();
        let token = self.token_issuer.issue_token(api_key).await;
        self.metrics
            .observe_upstream_latency(Stage::Token, started.elapsed().as_secs_f64());
        let token = token?;
        debug!("IAM token obtained");

        let payload = self.shaper.shape(request);

        let started = Instant::now();
        let response = self
            .prediction_client
            .predict(endpoint_url, &token, &payload)
            .await;
        self.metrics
            .observe_upstream_latency(Stage::Prediction, started.elapsed().as_secs_f64());
        let response = response?;

        let result = extract_result(&response)?;
        info!(
            prediction = %result.prediction,
            confidence = result.confidence,
            "Prediction extracted"
        );

        Ok(result)
    }

    /// Answer a call whose body could not be read
    ///
    /// Method and configuration errors still take precedence.
    pub fn reject_body(
        &self,
        method: &Method,
        reason: impl Into<String>,
    ) -> Result<PredictionResult> {
        self.admit(method)?;
        Err(ProxyError::InvalidRequest(reason.into()))
    }

    fn admit(&self, method: &Method) -> Result<(&str, &str)> {
        if *method != Method::POST {
            return Err(ProxyError::MethodNotAllowed);
        }

        self.config
            .credentials
            .resolve()
            .ok_or(ProxyError::ServerMisconfigured)
    }
}
