//! Config command - inspect the resolved configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use findata_store::{
    AppConfig, default_config_dir, default_config_path, default_history_path,
    default_session_path,
};
use serde_json::json;

use super::print_json;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the configuration after file and environment overrides.
    Show,

    /// Show configuration paths.
    Path,
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_paths(cli),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = AppConfig::load()?;
    let session_file = config
        .session_file
        .clone()
        .unwrap_or_else(default_session_path);

    match cli.format {
        OutputFormat::Text => {
            println!("FinData Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("API base URL:     {}", config.api_base_url);
            println!("Request timeout:  {}s", config.request_timeout.as_secs());
            println!("Scraping timeout: {}s", config.scraping_timeout.as_secs());
            println!(
                "Retries:          {} (base delay {}ms)",
                config.max_retries,
                config.retry_delay.as_millis()
            );
            println!("Session file:     {}", session_file.display());
        }
        OutputFormat::Json => {
            let output = json!({
                "api_base_url": config.api_base_url.as_str(),
                "request_timeout_ms": config.request_timeout.as_millis(),
                "scraping_timeout_ms": config.scraping_timeout.as_millis(),
                "max_retries": config.max_retries,
                "retry_delay_ms": config.retry_delay.as_millis(),
                "session_file": session_file.display().to_string(),
            });
            print_json(&output, cli)?;
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = default_config_path();
    let session_file = default_session_path();
    let history_file = default_history_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Config file:   {}", config_file.display());
            println!("Session file:  {}", session_file.display());
            println!("History file:  {}", history_file.display());
        }
        OutputFormat::Json => {
            let paths = json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
                "session_file": session_file.display().to_string(),
                "history_file": history_file.display().to_string(),
            });
            print_json(&paths, cli)?;
        }
    }

    Ok(())
}
