// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `FinData` CLI - the scraping and analytics API from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in (password from FINDATA_PASSWORD when omitted)
//! findata login alice
//!
//! # Dashboard counters
//! findata stats
//!
//! # Extract articles, https:// is assumed
//! findata extract example.com --max-articles 30
//!
//! # JSON output
//! findata --format json --pretty analytics
//!
//! # Follow logins and logouts from other terminals
//! findata watch
//! ```

mod commands;
mod navigator;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use findata_api::ApiError;
use findata_core::FailureKind;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{auth, config, dashboard, extract, health, history, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// `FinData` CLI - financial news scraping and analytics.
#[derive(Parser)]
#[command(name = "findata")]
#[command(about = "FinData scraping and analytics CLI")]
#[command(long_about = r#"
FinData extracts articles from financial news sites and reports
per-user scraping statistics.

The session is stored in the user config directory and shared by every
findata process, so logging out in one terminal logs out all of them.

Examples:
  findata login alice              # Log in
  findata extract example.com      # Extract articles
  findata stats                    # Dashboard counters
  findata --format json analytics  # JSON output
"#)]
#[command(version)]
#[command(author = "FinData Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session.
    Login(auth::LoginArgs),

    /// Log out, everywhere.
    Logout,

    /// Create an account.
    Register(auth::RegisterArgs),

    /// Show the stored session.
    Whoami,

    /// Show dashboard counters.
    #[command(visible_alias = "s")]
    Stats,

    /// Show per-domain analytics and recent runs.
    #[command(visible_alias = "a")]
    Analytics,

    /// Show stats and analytics together.
    #[command(visible_alias = "d")]
    Dashboard,

    /// Extract articles from a site.
    #[command(visible_alias = "x")]
    Extract(extract::ExtractArgs),

    /// Check backend health.
    Health,

    /// Show recent extractions.
    History(history::HistoryArgs),

    /// Print every login and logout as it happens.
    #[command(visible_alias = "w")]
    Watch,

    /// Show configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Not logged in, or the session expired.
    AuthRequired = 2,
    /// Input rejected before sending.
    Validation = 3,
    /// Network failure or timeout.
    Network = 4,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        let kind = error.downcast_ref::<ApiError>().and_then(ApiError::kind);
        match kind {
            Some(FailureKind::Auth) => Self::AuthRequired,
            Some(FailureKind::Validation) => Self::Validation,
            Some(FailureKind::Transport) => Self::Network,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("findata=debug,info")
    } else {
        EnvFilter::new("findata=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Login(args) => auth::login(args, &cli).await,
        Commands::Logout => auth::logout(&cli).await,
        Commands::Register(args) => auth::register(args, &cli).await,
        Commands::Whoami => auth::whoami(&cli).await,
        Commands::Stats => dashboard::stats(&cli).await,
        Commands::Analytics => dashboard::analytics(&cli).await,
        Commands::Dashboard => dashboard::overview(&cli).await,
        Commands::Extract(args) => extract::run(args, &cli).await,
        Commands::Health => health::run(&cli).await,
        Commands::History(args) => history::run(args, &cli).await,
        Commands::Watch => watch::run(&cli).await,
        Commands::Config(args) => config::run(args, &cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            report_error(&e, &cli);
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

/// Prints a failed command's error in the selected format.
fn report_error(error: &anyhow::Error, cli: &Cli) {
    if cli.format == OutputFormat::Json {
        if let Some(api) = error.downcast_ref::<ApiError>() {
            if commands::print_json(&output::ErrorOutput::from(api), cli).is_ok() {
                return;
            }
        }
    }
    eprintln!("{}", commands::text(cli).format_error("findata", &error.to_string()));
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use findata_api::ValidationError;

    #[test]
    fn test_cli_parses_extract() {
        let cli = Cli::try_parse_from([
            "findata",
            "--format",
            "json",
            "extract",
            "example.com",
            "--method",
            "requests",
            "--max-articles",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.url, "example.com");
        assert_eq!(args.max_articles, 30);
        assert_eq!(args.max_summaries, 10);
    }

    #[test]
    fn test_exit_codes() {
        let auth = anyhow::Error::new(ApiError::Auth {
            message: "expired".to_string(),
        });
        assert_eq!(ExitCode::for_error(&auth), ExitCode::AuthRequired);

        let invalid = anyhow::Error::new(ApiError::from(ValidationError::InvalidEmail));
        assert_eq!(ExitCode::for_error(&invalid), ExitCode::Validation);

        let offline = anyhow::Error::new(ApiError::Transport {
            message: "Unable to reach the server".to_string(),
            cause: "connection refused".to_string(),
        });
        assert_eq!(ExitCode::for_error(&offline), ExitCode::Network);

        assert_eq!(
            ExitCode::for_error(&anyhow::anyhow!("disk full")),
            ExitCode::Error
        );
    }
}
