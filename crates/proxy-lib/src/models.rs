//! Core data models for the prediction proxy

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Number of positional values in a compact sensor reading
pub const READING_LEN: usize = 6;

/// A single slot of a sensor reading: either a category code or a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Number(n) => Value::Number(n),
            Scalar::Text(s) => Value::String(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Number::from_f64(v)
            .map(Scalar::Number)
            .unwrap_or_else(|| Scalar::Text(v.to_string()))
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::Number(v.into())
    }
}

/// Machine sensor reading in the fixed positional order used by the UI form
///
/// Serialized as a six-element array:
/// `[type, air_temp, process_temp, rotational_speed, torque, tool_wear]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Scalar; READING_LEN]", into = "[Scalar; READING_LEN]")]
pub struct SensorReading {
    pub machine_type: Scalar,
    pub air_temperature: Scalar,
    pub process_temperature: Scalar,
    pub rotational_speed: Scalar,
    pub torque: Scalar,
    pub tool_wear: Scalar,
}

impl From<[Scalar; READING_LEN]> for SensorReading {
    fn from(values: [Scalar; READING_LEN]) -> Self {
        let [machine_type, air_temperature, process_temperature, rotational_speed, torque, tool_wear] =
            values;
        Self {
            machine_type,
            air_temperature,
            process_temperature,
            rotational_speed,
            torque,
            tool_wear,
        }
    }
}

impl From<SensorReading> for [Scalar; READING_LEN] {
    fn from(r: SensorReading) -> Self {
        [
            r.machine_type,
            r.air_temperature,
            r.process_temperature,
            r.rotational_speed,
            r.torque,
            r.tool_wear,
        ]
    }
}

/// Compact request body sent by the frontend form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactRequest {
    pub input_data: Vec<CompactInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactInput {
    pub values: Vec<SensorReading>,
}

impl CompactRequest {
    /// Wrap a single reading into the compact request shape
    pub fn single(reading: SensorReading) -> Self {
        Self {
            input_data: vec![CompactInput {
                values: vec![reading],
            }],
        }
    }
}

/// Full scoring payload expected by the downstream model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequestPayload {
    pub input_data: Vec<ScoringInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringInput {
    pub fields: Vec<String>,
    pub values: Vec<Vec<Value>>,
}

/// Simplified result returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: f64,
}

/// Error body returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
