//! Health check infrastructure for the prediction proxy
//!
//! Tracks the health of the configuration and the two upstream services for
//! liveness and readiness probes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is experiencing issues but still operational
    Degraded,
    /// Component has failed
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

/// Information about a component's health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Degraded,
            message: Some(message.into()),
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Unhealthy,
            message: Some(message.into()),
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across all components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        let mut has_degraded = false;

        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
                ComponentStatus::Degraded => has_degraded = true,
                ComponentStatus::Healthy => {}
            }
        }

        if has_degraded {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const CREDENTIALS: &str = "credentials";
    pub const TOKEN_ISSUER: &str = "token_issuer";
    pub const PREDICTION_CLIENT: &str = "prediction_client";
}

#[derive(Debug, Clone)]
enum Readiness {
    Starting,
    Ready,
    NotReady(String),
}

/// Health registry for tracking component health
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    readiness: Arc<RwLock<Readiness>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            readiness: Arc::new(RwLock::new(Readiness::Starting)),
        }
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), ComponentHealth::healthy());
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    pub async fn set_ready(&self, ready: bool) {
        let mut r = self.readiness.write().await;
        *r = if ready {
            Readiness::Ready
        } else {
            Readiness::Starting
        };
    }

    /// Mark the service as started but unable to serve
    pub async fn set_not_ready(&self, reason: impl Into<String>) {
        let mut r = self.readiness.write().await;
        *r = Readiness::NotReady(reason.into());
    }

    /// Apply the startup credential check
    ///
    /// Missing credentials make every prediction fail, so the credentials
    /// component is unhealthy and the proxy is not ready.
    pub async fn check_credentials(&self, missing: &[&str]) {
        if missing.is_empty() {
            self.set_healthy(components::CREDENTIALS).await;
            self.set_ready(true).await;
        } else {
            let reason = format!("{} not set", missing.join(", "));
            self.set_unhealthy(components::CREDENTIALS, reason.clone())
                .await;
            self.set_not_ready(reason).await;
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let readiness = self.readiness.read().await.clone();
        let health = self.health().await;

        match readiness {
            Readiness::Starting => ReadinessResponse {
                ready: false,
                reason: Some("Proxy not yet initialized".to_string()),
            },
            Readiness::NotReady(reason) => ReadinessResponse {
                ready: false,
                reason: Some(reason),
            },
            Readiness::Ready if health.status == ComponentStatus::Unhealthy => ReadinessResponse {
                ready: false,
                reason: Some("Critical component unhealthy".to_string()),
            },
            Readiness::Ready => ReadinessResponse {
                ready: true,
                reason: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_registry_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_health_registry_degraded_status() {
        let registry = HealthRegistry::new();
        registry.register(components::TOKEN_ISSUER).await;
        registry.register(components::PREDICTION_CLIENT).await;

        registry
            .set_degraded(components::TOKEN_ISSUER, "Authentication with IBM Cloud failed.")
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert!(health.status.is_operational());
    }

    #[tokio::test]
    async fn test_health_registry_unhealthy_status() {
        let registry = HealthRegistry::new();
        registry.register(components::CREDENTIALS).await;
        registry
            .set_unhealthy(components::CREDENTIALS, "WML_API_KEY not set")
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert!(!health.status.is_operational());
    }

    #[tokio::test]
    async fn test_readiness_not_ready_initially() {
        let registry = HealthRegistry::new();
        let readiness = registry.readiness().await;

        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[tokio::test]
    async fn test_readiness_ready_when_set() {
        let registry = HealthRegistry::new();
        registry.set_ready(true).await;

        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_readiness_not_ready_reports_reason() {
        let registry = HealthRegistry::new();
        registry.set_not_ready("WML credentials not set").await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("WML credentials not set"));
    }

    #[tokio::test]
    async fn test_readiness_not_ready_when_unhealthy() {
        let registry = HealthRegistry::new();
        registry.register(components::CREDENTIALS).await;
        registry.set_ready(true).await;
        registry.set_unhealthy(components::CREDENTIALS, "Failed").await;

        assert!(!registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_check_credentials_missing_marks_unhealthy() {
        let registry = HealthRegistry::new();
        registry.register(components::CREDENTIALS).await;
        registry
            .check_credentials(&["WML_API_KEY", "WML_ENDPOINT_URL"])
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert_eq!(
            health.components[components::CREDENTIALS].message.as_deref(),
            Some("WML_API_KEY, WML_ENDPOINT_URL not set")
        );

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("WML_API_KEY, WML_ENDPOINT_URL not set")
        );
    }

    #[tokio::test]
    async fn test_check_credentials_complete_marks_ready() {
        let registry = HealthRegistry::new();
        registry.register(components::CREDENTIALS).await;
        registry.check_credentials(&[]).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
        assert!(registry.readiness().await.ready);
    }
}
