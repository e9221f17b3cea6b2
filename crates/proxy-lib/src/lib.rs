//! Prediction proxy library for the machine failure model
//!
//! This crate provides the core functionality for:
//! - Resolving compact and full-schema request bodies
//! - IAM token issuance and WML scoring calls
//! - Extracting the predicted label and confidence
//! - The HTTP router, health checks and observability

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod payload;
pub mod proxy;
pub mod scoring;
pub mod token;

pub use config::{Credentials, ProxyConfig};
pub use error::{ProxyError, Stage};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ProxyMetrics, StructuredLogger};
pub use payload::{InboundRequest, PayloadShaper, ShapedPayload};
pub use proxy::PredictionProxy;
pub use scoring::{extract_result, PredictionClient, WmlPredictionClient};
pub use token::{BearerToken, IamTokenIssuer, TokenIssuer};
