//! Extract command.

use anyhow::Result;
use clap::Args;
use findata_core::{ExtractRequest, ScrapeMethod, SuccessMessage};
use tracing::info;

use super::{connect, print_json, text};
use crate::{Cli, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Site to scrape. `https://` is assumed when no scheme is given.
    pub url: String,

    /// Fetch strategy: scrapedo or requests.
    #[arg(long, short, default_value = "scrapedo")]
    pub method: ScrapeMethod,

    /// Maximum number of articles (1-100).
    #[arg(long, default_value = "20")]
    pub max_articles: u32,

    /// Maximum number of AI summaries.
    #[arg(long, default_value = "10")]
    pub max_summaries: u32,
}

/// Runs the extract command.
pub async fn run(args: &ExtractArgs, cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let request = ExtractRequest::new(&args.url)
        .with_method(args.method)
        .with_max_articles(args.max_articles)
        .with_max_summaries(args.max_summaries);

    if !cli.quiet && cli.format == OutputFormat::Text {
        eprintln!(
            "{} (this can take up to {}s)",
            client.config().messages.success(SuccessMessage::ScrapingStarted),
            client.config().scraping_timeout.as_secs()
        );
    }

    let response = client.scraping().extract_articles(request).await?;
    info!(articles = response.articles.len(), "Extraction done");

    match cli.format {
        OutputFormat::Text => println!("{}", text(cli).format_extract(&response)),
        OutputFormat::Json => print_json(&response, cli)?,
    }
    Ok(())
}
