//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod history;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use findata_api::FinDataClient;
use findata_store::{
    AppConfig, FileStorage, ScrapingHistory, SessionStore, default_session_path,
    storage::file::DEFAULT_POLL_INTERVAL,
};
use tracing::debug;

use crate::Cli;
use crate::navigator::NoticeNavigator;
use crate::output::{JsonFormatter, TextFormatter};

/// Builds a client on the shared session file.
///
/// The file is watched so that sessions changed by other `findata`
/// processes are noticed.
pub async fn connect(cli: &Cli) -> Result<FinDataClient> {
    let config = AppConfig::load()?;
    let session_path = config
        .session_file
        .clone()
        .unwrap_or_else(default_session_path);
    debug!(path = %session_path.display(), "Opening session file");

    let storage = FileStorage::open(session_path)?;
    storage.spawn_watcher(DEFAULT_POLL_INTERVAL);
    let session = SessionStore::with_keys(storage, config.storage_keys.clone());

    let client = FinDataClient::builder(config)
        .session(session)
        .navigator(Arc::new(NoticeNavigator::new(cli.quiet, !cli.no_color)))
        .history(ScrapingHistory::load_default().await)
        .build()?;
    Ok(client)
}

/// Prints `value` as JSON, honouring `--pretty`.
pub fn print_json<T: serde::Serialize>(value: &T, cli: &Cli) -> Result<()> {
    println!("{}", JsonFormatter::new(cli.pretty).format(value)?);
    Ok(())
}

/// Text formatter honouring `--no-color`.
pub fn text(cli: &Cli) -> TextFormatter {
    TextFormatter::new(!cli.no_color)
}
