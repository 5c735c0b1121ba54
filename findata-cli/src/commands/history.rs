//! History command - recent extractions made from this machine.

use anyhow::Result;
use clap::Args;
use findata_store::ScrapingHistory;

use super::{print_json, text};
use crate::{Cli, OutputFormat};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Forget all entries.
    #[arg(long)]
    pub clear: bool,
}

/// Runs the history command.
pub async fn run(args: &HistoryArgs, cli: &Cli) -> Result<()> {
    let history = ScrapingHistory::load_default().await;

    if args.clear {
        history.clear().await?;
        if !cli.quiet {
            println!("History cleared");
        }
        return Ok(());
    }

    let entries = history.entries().await;
    match cli.format {
        OutputFormat::Text => println!("{}", text(cli).format_history(&entries)),
        OutputFormat::Json => print_json(&entries, cli)?,
    }
    Ok(())
}
