//! Error types for the prediction proxy

use std::fmt;
use thiserror::Error;

/// Result type alias for proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Outbound stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Token,
    Prediction,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Token => "token",
            Stage::Prediction => "prediction",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Token => f.write_str("Token"),
            Stage::Prediction => f.write_str("Prediction"),
        }
    }
}

/// Errors that terminate a prediction request
///
/// The `Display` text is what the caller receives in the `message` field, so
/// it must never carry upstream bodies or credentials.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Server configuration error.")]
    ServerMisconfigured,

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Authentication with IBM Cloud failed.")]
    AuthenticationFailed,

    #[error("{stage} request could not be completed: {reason}")]
    UpstreamUnreachable { stage: Stage, reason: String },

    #[error("Prediction API call failed. Status: {status}.")]
    PredictionRequestFailed { status: u16 },

    #[error("Invalid response structure from prediction API.")]
    InvalidUpstreamResponse,
}

impl ProxyError {
    /// HTTP status code reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::MethodNotAllowed => 405,
            _ => 500,
        }
    }

    /// Short machine-readable kind, used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed => "method_not_allowed",
            ProxyError::ServerMisconfigured => "server_misconfigured",
            ProxyError::InvalidRequest(_) => "invalid_request",
            ProxyError::AuthenticationFailed => "authentication_failed",
            ProxyError::UpstreamUnreachable { .. } => "upstream_unreachable",
            ProxyError::PredictionRequestFailed { .. } => "prediction_request_failed",
            ProxyError::InvalidUpstreamResponse => "invalid_upstream_response",
        }
    }

    /// Build a transport error for the given stage
    pub fn unreachable(stage: Stage, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.without_url().to_string()
        };
        Self::UpstreamUnreachable { stage, reason }
    }
}
