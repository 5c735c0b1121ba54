//! Dashboard commands: stats, analytics, dashboard.

use anyhow::Result;

use super::{connect, print_json, text};
use crate::{Cli, OutputFormat};

/// Runs the stats command.
pub async fn stats(cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let stats = client.dashboard().get_stats().await?;

    match cli.format {
        OutputFormat::Text => println!("{}", text(cli).format_stats(&stats)),
        OutputFormat::Json => print_json(&stats, cli)?,
    }
    Ok(())
}

/// Runs the analytics command.
pub async fn analytics(cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let analytics = client.dashboard().get_analytics().await?;

    match cli.format {
        OutputFormat::Text => println!("{}", text(cli).format_analytics(&analytics)),
        OutputFormat::Json => print_json(&analytics, cli)?,
    }
    Ok(())
}

/// Runs the dashboard command.
pub async fn overview(cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let overview = client.dashboard().overview().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = text(cli);
            println!("{}", formatter.format_stats(&overview.stats));
            println!();
            println!("{}", formatter.format_analytics(&overview.analytics));
        }
        OutputFormat::Json => print_json(&overview, cli)?,
    }
    Ok(())
}
