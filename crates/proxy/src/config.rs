//! Service configuration

use anyhow::{Context, Result};
use proxy_lib::config::{Credentials, ProxyConfig, DEFAULT_IAM_TOKEN_URL};
use serde::Deserialize;
use std::time::Duration;

/// WML settings, read from `WML_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct WmlSettings {
    /// IAM API key
    pub api_key: Option<String>,

    /// Scoring endpoint of the WML deployment
    pub endpoint_url: Option<String>,

    /// IAM token endpoint
    #[serde(default = "default_iam_token_url")]
    pub iam_token_url: String,

    /// Value placed in the `Target` slot of expanded payloads
    #[serde(default = "default_target_placeholder")]
    pub target_placeholder: i64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Listener settings, read from `PROXY_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ListenSettings {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub wml: WmlSettings,
    pub listen: ListenSettings,
}

fn default_iam_token_url() -> String {
    DEFAULT_IAM_TOKEN_URL.to_string()
}

fn default_target_placeholder() -> i64 {
    1
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_port() -> u16 {
    3000
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

impl ServiceConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit variable map instead of the environment
    pub fn load_from(vars: Option<config::Map<String, String>>) -> Result<Self> {
        let wml = config::Config::builder()
            .add_source(config::Environment::with_prefix("WML").source(vars.clone()))
            .build()
            .context("Failed to read WML settings")?
            .try_deserialize::<WmlSettings>()
            .context("Invalid WML settings")?;

        let listen = config::Config::builder()
            .add_source(config::Environment::with_prefix("PROXY").source(vars))
            .build()
            .context("Failed to read listener settings")?
            .try_deserialize::<ListenSettings>()
            .context("Invalid listener settings")?;

        Ok(Self { wml, listen })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen.bind_addr, self.listen.port)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: self.wml.api_key.clone(),
            endpoint_url: self.wml.endpoint_url.clone(),
        }
    }

    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            credentials: self.credentials(),
            iam_token_url: self.wml.iam_token_url.clone(),
            target_placeholder: self.wml.target_placeholder.into(),
            request_timeout: Duration::from_secs(self.wml.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.wml.connect_timeout_secs),
        }
    }
}
