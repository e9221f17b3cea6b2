//! API client for communicating with the prediction proxy

use anyhow::{Context, Result};
use proxy_lib::config::DEFAULT_REQUEST_TIMEOUT;
use proxy_lib::models::ErrorResponse;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use url::Url;

/// Total request timeout; the proxy makes two upstream calls per prediction,
/// each bounded by its own timeout, so this must outlast both.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// API client for the prediction proxy
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request and return the body regardless of status
    ///
    /// Used for probes, which answer 503 with a JSON body.
    pub async fn probe<T: DeserializeOwned>(&self, path: &str) -> Result<(StatusCode, T)> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response.json().await.context("Failed to parse response")?;
        Ok((status, body))
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_lib::models::{CompactRequest, PredictionResult, SensorReading};
    use serde_json::json;

    fn reading() -> SensorReading {
        serde_json::from_value(json!(["L", 298.1, 308.6, 1551, 42.8, 0])).unwrap()
    }

    #[tokio::test]
    async fn test_post_sends_compact_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/predict")
            .match_body(mockito::Matcher::Json(json!({
                "input_data": [ { "values": [ ["L", 298.1, 308.6, 1551, 42.8, 0] ] } ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"prediction":"No Failure","confidence":0.97}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result: PredictionResult = client
            .post("api/predict", &CompactRequest::single(reading()))
            .await
            .unwrap();

        assert_eq!(result.prediction, "No Failure");
        assert_eq!(result.confidence, 0.97);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_surfaces_proxy_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/predict")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Server configuration error."}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client
            .post::<PredictionResult, _>("api/predict", &CompactRequest::single(reading()))
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("Server configuration error."));
    }

    #[tokio::test]
    async fn test_probe_returns_unavailable_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/readyz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ready":false,"reason":"WML_API_KEY not set"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let (status, body): (StatusCode, serde_json::Value) = client.probe("readyz").await.unwrap();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);
    }

    #[test]
    fn test_timeout_outlasts_both_upstream_calls() {
        assert!(REQUEST_TIMEOUT > DEFAULT_REQUEST_TIMEOUT * 2);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
