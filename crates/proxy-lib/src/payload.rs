//! Inbound body resolution and downstream payload shaping

use crate::error::{ProxyError, Result};
use crate::models::{CompactRequest, ModelRequestPayload, ScoringInput, SensorReading};
use serde::Serialize;
use serde_json::Value;

/// Field names of the downstream model schema, in positional order
pub const MODEL_FIELDS: [&str; 9] = [
    "UDI",
    "Product ID",
    "Type",
    "Air temperature [K]",
    "Process temperature [K]",
    "Rotational speed [rpm]",
    "Torque [Nm]",
    "Tool wear [min]",
    "Target",
];

/// Placeholder for the `UDI` slot
pub const UDI_PLACEHOLDER: u64 = 0;

/// Placeholder for the `Product ID` slot
pub const PRODUCT_ID_PLACEHOLDER: &str = "L50070";

/// Inbound body after shape resolution
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRequest {
    /// Six-value reading from the form
    Compact(SensorReading),
    /// Body already in the downstream schema, forwarded untouched
    PassThrough(Value),
}

impl InboundRequest {
    /// Resolve the body into one of the two accepted shapes
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(ProxyError::InvalidRequest("body is empty".to_string()));
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ProxyError::InvalidRequest(format!("malformed JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        if value.pointer("/input_data/0/fields").is_some() {
            return Self::check_full_schema(&value).map(|_| Self::PassThrough(value));
        }

        let compact: CompactRequest = serde_json::from_value(value).map_err(|e| {
            ProxyError::InvalidRequest(format!("expected input_data[0].values[0]: {}", e))
        })?;

        compact
            .input_data
            .into_iter()
            .next()
            .and_then(|input| input.values.into_iter().next())
            .map(Self::Compact)
            .ok_or_else(|| {
                ProxyError::InvalidRequest("input_data[0].values[0] is missing".to_string())
            })
    }

    fn check_full_schema(value: &Value) -> Result<()> {
        let fields_ok = value
            .pointer("/input_data/0/fields")
            .map_or(false, Value::is_array);
        let values_ok = value
            .pointer("/input_data/0/values")
            .map_or(false, Value::is_array);
        if fields_ok && values_ok {
            Ok(())
        } else {
            Err(ProxyError::InvalidRequest(
                "input_data[0] must carry fields and values arrays".to_string(),
            ))
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundRequest::Compact(_) => "compact",
            InboundRequest::PassThrough(_) => "pass_through",
        }
    }
}

/// Payload sent to the prediction endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShapedPayload {
    Expanded(ModelRequestPayload),
    PassThrough(Value),
}

/// Expands compact readings into the nine-field model schema
#[derive(Debug, Clone)]
pub struct PayloadShaper {
    target_placeholder: Value,
}

impl PayloadShaper {
    pub fn new(target_placeholder: Value) -> Self {
        Self { target_placeholder }
    }

    pub fn shape(&self, request: InboundRequest) -> ShapedPayload {
        match request {
            InboundRequest::Compact(reading) => ShapedPayload::Expanded(self.expand(reading)),
            InboundRequest::PassThrough(body) => ShapedPayload::PassThrough(body),
        }
    }

    /// Place the reading at slots 2..=7, placeholders at 0, 1 and 8
    pub fn expand(&self, reading: SensorReading) -> ModelRequestPayload {
        let row = vec![
            Value::from(UDI_PLACEHOLDER),
            Value::from(PRODUCT_ID_PLACEHOLDER),
            reading.machine_type.into(),
            reading.air_temperature.into(),
            reading.process_temperature.into(),
            reading.rotational_speed.into(),
            reading.torque.into(),
            reading.tool_wear.into(),
            self.target_placeholder.clone(),
        ];

        ModelRequestPayload {
            input_data: vec![ScoringInput {
                fields: MODEL_FIELDS.iter().map(|f| f.to_string()).collect(),
                values: vec![row],
            }],
        }
    }
}
