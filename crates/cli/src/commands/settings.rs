//! Config file commands

use anyhow::{Context, Result};

use crate::config::Config;
use crate::output::{print_json, print_success, OutputFormat};

/// Print the current CLI configuration
pub fn show(config: &Config) -> Result<()> {
    print_json(config)
}

/// Persist the default proxy URL
pub fn set_url(mut config: Config, url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    config.api_url = Some(url.to_string());
    let path = config.save()?;
    print_success(&format!("Saved api_url to {}", path.display()));
    Ok(())
}

/// Persist the default output format
pub fn set_format(mut config: Config, format: OutputFormat) -> Result<()> {
    let name = match format {
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
    };
    config.default_format = Some(name.to_string());
    let path = config.save()?;
    print_success(&format!("Saved default_format to {}", path.display()));
    Ok(())
}
