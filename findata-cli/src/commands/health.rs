//! Health command.

use anyhow::Result;

use super::{connect, print_json, text};
use crate::{Cli, OutputFormat};

/// Runs the health command.
pub async fn run(cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let health = client.health().check_health().await?;

    match cli.format {
        OutputFormat::Text => println!("{}", text(cli).format_health(&health)),
        OutputFormat::Json => print_json(&health, cli)?,
    }
    Ok(())
}
