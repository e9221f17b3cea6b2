//! Prediction command

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use proxy_lib::models::{CompactRequest, PredictionResult, Scalar, SensorReading};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_confidence, color_prediction, format_confidence, print_json, OutputFormat};

/// Product quality variant of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MachineType {
    /// Low quality variant
    L,
    /// Medium quality variant
    M,
    /// High quality variant
    H,
}

impl MachineType {
    pub fn code(&self) -> &'static str {
        match self {
            MachineType::L => "L",
            MachineType::M => "M",
            MachineType::H => "H",
        }
    }
}

/// Sensor reading arguments
#[derive(Debug, Clone, Args)]
pub struct ReadingArgs {
    /// Machine type (product quality variant)
    #[arg(long = "type", value_enum, ignore_case = true)]
    pub machine_type: MachineType,

    /// Air temperature in Kelvin
    #[arg(long)]
    pub air_temp: f64,

    /// Process temperature in Kelvin
    #[arg(long)]
    pub process_temp: f64,

    /// Rotational speed in rpm
    #[arg(long)]
    pub rpm: u64,

    /// Torque in Nm
    #[arg(long)]
    pub torque: f64,

    /// Tool wear in minutes
    #[arg(long)]
    pub tool_wear: u64,
}

impl ReadingArgs {
    pub fn to_reading(&self) -> SensorReading {
        SensorReading {
            machine_type: Scalar::from(self.machine_type.code()),
            air_temperature: Scalar::from(self.air_temp),
            process_temperature: Scalar::from(self.process_temp),
            rotational_speed: Scalar::from(self.rpm),
            torque: Scalar::from(self.torque),
            tool_wear: Scalar::from(self.tool_wear),
        }
    }
}

#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Prediction")]
    prediction: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

/// Submit a reading to the proxy and print the result
pub async fn predict(client: &ApiClient, args: &ReadingArgs, format: OutputFormat) -> Result<()> {
    let request = CompactRequest::single(args.to_reading());
    let result: PredictionResult = client.post("api/predict", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "Failure Prediction".bold());
            println!(
                "Type {}  Air {} K  Process {} K  {} rpm  {} Nm  wear {} min",
                args.machine_type.code().cyan(),
                args.air_temp,
                args.process_temp,
                args.rpm,
                args.torque,
                args.tool_wear
            );
            println!();

            let rows = vec![PredictionRow {
                prediction: color_prediction(&result.prediction),
                confidence: color_confidence(result.confidence),
            }];
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "\nModel is {} confident in '{}'",
                format_confidence(result.confidence),
                result.prediction
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reading_args_keep_positional_order() {
        let args = ReadingArgs {
            machine_type: MachineType::M,
            air_temp: 298.1,
            process_temp: 308.6,
            rpm: 1551,
            torque: 42.8,
            tool_wear: 0,
        };

        let value = serde_json::to_value(args.to_reading()).unwrap();
        assert_eq!(value, json!(["M", 298.1, 308.6, 1551, 42.8, 0]));
    }
}
