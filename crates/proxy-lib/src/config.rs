//! Runtime configuration injected into the proxy

use serde_json::Value;
use std::time::Duration;

/// Default IBM Cloud IAM token endpoint
pub const DEFAULT_IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// Default per-call timeout for outbound requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout for outbound requests
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// WML credentials read from the environment
///
/// Both values are optional so that a misconfigured process can still start and
/// report the problem on every request instead of crashing.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, endpoint_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            endpoint_url: Some(endpoint_url.into()),
        }
    }

    /// Returns `(api_key, endpoint_url)` when both are present and non-empty
    pub fn resolve(&self) -> Option<(&str, &str)> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let endpoint = self.endpoint_url.as_deref().filter(|u| !u.is_empty())?;
        Some((api_key, endpoint))
    }

    pub fn is_complete(&self) -> bool {
        self.resolve().is_some()
    }

    /// Names of the settings that are missing, for startup diagnostics
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            missing.push("WML_API_KEY");
        }
        if self.endpoint_url.as_deref().map_or(true, str::is_empty) {
            missing.push("WML_ENDPOINT_URL");
        }
        missing
    }
}

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub credentials: Credentials,
    /// IAM token endpoint
    pub iam_token_url: String,
    /// Value sent in the `Target` slot of an expanded payload
    pub target_placeholder: Value,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            iam_token_url: DEFAULT_IAM_TOKEN_URL.to_string(),
            target_placeholder: Value::from(1),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ProxyConfig {
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }
}
