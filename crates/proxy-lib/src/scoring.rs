//! Prediction submission to the WML scoring endpoint and result extraction

use crate::error::{ProxyError, Result, Stage};
use crate::models::PredictionResult;
use crate::payload::ShapedPayload;
use crate::token::BearerToken;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

/// Submits a shaped payload to the prediction endpoint
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Returns the raw JSON body of a successful scoring response
    async fn predict(
        &self,
        endpoint_url: &str,
        token: &BearerToken,
        payload: &ShapedPayload,
    ) -> Result<Value>;
}

/// Scoring client for a Watson Machine Learning deployment
pub struct WmlPredictionClient {
    client: Client,
}

impl WmlPredictionClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PredictionClient for WmlPredictionClient {
    async fn predict(
        &self,
        endpoint_url: &str,
        token: &BearerToken,
        payload: &ShapedPayload,
    ) -> Result<Value> {
        debug!(endpoint = %endpoint_url, "Submitting prediction request");

        let response = self
            .client
            .post(endpoint_url)
            .bearer_auth(token.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| ProxyError::unreachable(Stage::Prediction, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %body,
                "Error response from prediction API"
            );
            return Err(ProxyError::PredictionRequestFailed {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| {
            error!(error = %e, "Prediction response is not valid JSON");
            ProxyError::InvalidUpstreamResponse
        })
    }
}

/// Extract `{prediction, confidence}` from `predictions[0].values[0]`
///
/// The record must be `[label, probabilities]` with a string label and a
/// non-empty array of numbers. Confidence is the highest probability.
pub fn extract_result(response: &Value) -> Result<PredictionResult> {
    let invalid = || {
        error!(response = %response, "Invalid response structure from prediction API");
        ProxyError::InvalidUpstreamResponse
    };

    let record = response
        .pointer("/predictions/0/values/0")
        .and_then(Value::as_array)
        .filter(|r| r.len() >= 2)
        .ok_or_else(invalid)?;

    let label = record[0].as_str().ok_or_else(invalid)?;
    let probabilities = record[1]
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;

    let confidence = max_probability(&probabilities).ok_or_else(invalid)?;

    Ok(PredictionResult {
        prediction: label.to_string(),
        confidence,
    })
}

/// Largest element of the vector, `None` when empty
pub fn max_probability(probabilities: &[f64]) -> Option<f64> {
    probabilities.iter().copied().reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelRequestPayload;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_extract_result_takes_max_probability() {
        let response = json!({
            "predictions": [ {
                "fields": ["prediction", "probability"],
                "values": [ ["Overstrain Failure", [0.1, 0.7, 0.2]] ]
            } ]
        });

        let result = extract_result(&response).unwrap();

        assert_eq!(result.prediction, "Overstrain Failure");
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_extract_result_single_probability() {
        let response = json!({ "predictions": [ { "values": [ ["No Failure", [0.93]] ] } ] });
        let result = extract_result(&response).unwrap();
        assert_eq!(result.confidence, 0.93);
    }

    #[test]
    fn test_extract_result_rejects_malformed_structures() {
        let cases = [
            json!({}),
            json!({ "predictions": [] }),
            json!({ "predictions": [ { "values": [] } ] }),
            json!({ "predictions": [ { "values": [ ["No Failure"] ] } ] }),
            json!({ "predictions": [ { "values": [ [42, [0.5]] ] } ] }),
            json!({ "predictions": [ { "values": [ ["No Failure", 0.5] ] } ] }),
            json!({ "predictions": [ { "values": [ ["No Failure", []] ] } ] }),
            json!({ "predictions": [ { "values": [ ["No Failure", ["high"]] ] } ] }),
        ];

        for case in cases {
            assert!(
                matches!(extract_result(&case), Err(ProxyError::InvalidUpstreamResponse)),
                "expected invalid structure for {}",
                case
            );
        }
    }

    #[test]
    fn test_max_probability() {
        assert_eq!(max_probability(&[0.2, 0.5, 0.3]), Some(0.5));
        assert_eq!(max_probability(&[1.0]), Some(1.0));
        assert_eq!(max_probability(&[0.0, 0.0]), Some(0.0));
        assert_eq!(max_probability(&[]), None);
    }

    #[test]
    fn test_extract_result_confidence_is_max_anywhere_in_vector() {
        let cases = [
            (json!([0.8, 0.1, 0.1]), 0.8),
            (json!([0.1, 0.2, 0.7]), 0.7),
            (json!([0.45, 0.1, 0.45]), 0.45),
            (json!([0.3, 0.3]), 0.3),
            (json!([0, 1]), 1.0),
            (json!([1, 0, 0]), 1.0),
            (json!([0, 0.25, 1e-3]), 0.25),
        ];

        for (probabilities, expected) in cases {
            let response = json!({
                "predictions": [ { "values": [ ["Tool Wear Failure", probabilities.clone()] ] } ]
            });
            let result = extract_result(&response).unwrap();
            assert_eq!(result.confidence, expected, "probabilities {}", probabilities);
        }
    }

    fn payload() -> ShapedPayload {
        ShapedPayload::Expanded(ModelRequestPayload { input_data: vec![] })
    }

    #[tokio::test]
    async fn test_predict_sends_bearer_token_and_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ml/v4/deployments/abc/predictions")
            .match_header("authorization", "Bearer tok-1")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "input_data": [] })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"predictions":[{"values":[["No Failure",[0.9,0.1]]]}]}"#)
            .create_async()
            .await;

        let client = WmlPredictionClient::new(Client::new());
        let url = format!("{}/ml/v4/deployments/abc/predictions", server.url());
        let body = client
            .predict(&url, &BearerToken::new("tok-1"), &payload())
            .await
            .unwrap();

        assert_eq!(extract_result(&body).unwrap().prediction, "No Failure");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_predict_non_success_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(403)
            .with_body(r#"{"errors":[{"code":"authorization_rejected"}]}"#)
            .create_async()
            .await;

        let client = WmlPredictionClient::new(Client::new());
        let err = client
            .predict(
                &format!("{}/score", server.url()),
                &BearerToken::new("tok"),
                &payload(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProxyError::PredictionRequestFailed { status: 403 }
        ));
        assert_eq!(err.to_string(), "Prediction API call failed. Status: 403.");
    }

    #[tokio::test]
    async fn test_predict_non_json_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = WmlPredictionClient::new(Client::new());
        let err = client
            .predict(
                &format!("{}/score", server.url()),
                &BearerToken::new("tok"),
                &payload(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::InvalidUpstreamResponse));
    }
}
