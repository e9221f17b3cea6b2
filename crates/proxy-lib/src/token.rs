//! Bearer token issuance against IBM Cloud IAM

use crate::error::{ProxyError, Result, Stage};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

/// Grant type for exchanging an API key for an IAM access token
pub const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Short-lived access token, scoped to a single prediction call
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Exchanges an API key for a bearer token
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_token(&self, api_key: &str) -> Result<BearerToken>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// IAM token issuer using the API-key grant
pub struct IamTokenIssuer {
    client: Client,
    token_url: String,
}

impl IamTokenIssuer {
    pub fn new(client: Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }
}

#[async_trait]
impl TokenIssuer for IamTokenIssuer {
    async fn issue_token(&self, api_key: &str) -> Result<BearerToken> {
        debug!(token_url = %self.token_url, "Requesting IAM token");

        let response = self
            .client
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(&[("grant_type", APIKEY_GRANT_TYPE), ("apikey", api_key)])
            .send()
            .await
            .map_err(|e| ProxyError::unreachable(Stage::Token, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %body,
                "Authentication with IBM Cloud failed"
            );
            return Err(ProxyError::AuthenticationFailed);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            error!(error = %e, "IAM token response is not valid JSON");
            ProxyError::AuthenticationFailed
        })?;

        match token.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) => {
                debug!(expires_in = ?token.expires_in, "IAM token issued");
                Ok(BearerToken::new(access_token))
            }
            None => {
                error!("IAM token response has no access_token");
                Err(ProxyError::AuthenticationFailed)
            }
        }
    }
}
