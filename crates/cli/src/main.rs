//! Machine Failure Predictor CLI
//!
//! A command-line tool for submitting sensor readings to the prediction
//! proxy and checking its health.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, predict, settings};

/// Machine Failure Predictor CLI
#[derive(Parser)]
#[command(name = "wmlp")]
#[command(author, version, about = "CLI for the Machine Failure Predictor proxy", long_about = None)]
pub struct Cli {
    /// Proxy URL (can also be set via WMLP_API_URL env var or the config file)
    #[arg(long, env = "WMLP_API_URL")]
    pub api_url: Option<String>,

    /// Output format (defaults to the config file setting, then table)
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict machine failure from a single sensor reading
    Predict(predict::ReadingArgs),

    /// Show proxy health and readiness
    Health,

    /// Manage CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Set the default proxy URL
    SetUrl {
        /// Proxy URL, e.g. https://predict.example.com
        url: String,
    },

    /// Set the default output format
    SetFormat {
        #[arg(value_enum)]
        format: output::OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;

    let format = cli
        .format
        .or_else(|| {
            config
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_name)
        })
        .unwrap_or_default();

    match cli.command {
        Commands::Predict(args) => {
            let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url.as_deref()))?;
            predict::predict(&client, &args, format).await?;
        }
        Commands::Health => {
            let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url.as_deref()))?;
            health::show_health(&client, format).await?;
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => settings::show(&config)?,
            ConfigCommands::SetUrl { url } => settings::set_url(config, &url)?,
            ConfigCommands::SetFormat { format } => settings::set_format(config, format)?,
        },
    }

    Ok(())
}
