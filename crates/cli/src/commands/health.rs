//! Health and readiness command

use anyhow::Result;
use colored::Colorize;
use proxy_lib::health::{HealthResponse, ReadinessResponse};
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_json, print_warning, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Serialize)]
struct HealthReport {
    health: HealthResponse,
    readiness: ReadinessResponse,
}

/// Show proxy health and readiness
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_, health): (_, HealthResponse) = client.probe("healthz").await?;
    let (_, readiness): (_, ReadinessResponse) = client.probe("readyz").await?;

    match format {
        OutputFormat::Json => print_json(&HealthReport { health, readiness })?,
        OutputFormat::Table => {
            println!("{}", "Proxy Health".bold());
            println!("{}", "=".repeat(50));
            println!("Endpoint:   {}", client.base_url().as_str().cyan());
            println!(
                "Status:     {}",
                color_status(&format!("{:?}", health.status).to_lowercase())
            );
            let ready = if readiness.ready { "ready" } else { "not ready" };
            println!("Readiness:  {}", color_status(ready));
            if let Some(reason) = &readiness.reason {
                print_warning(reason);
            }
            println!();

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, c)| ComponentRow {
                    name: name.clone(),
                    status: color_status(&format!("{:?}", c.status).to_lowercase()),
                    message: c.message.clone().unwrap_or_default(),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
