//! Scraping history.
//!
//! Keeps the most recent successful extractions, newest first, optionally
//! persisted to a JSON file.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use findata_core::{ExtractRequest, ExtractResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_history_path, load_json, save_json};

/// Maximum number of history entries kept.
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// A single successful extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Entry id (milliseconds since the epoch at recording time).
    pub id: i64,
    /// The URL that was scraped.
    pub url: String,
    /// Scraping method used.
    pub method: String,
    /// When the extraction finished.
    pub timestamp: DateTime<Utc>,
    /// Number of extracted articles.
    pub articles_count: u64,
    /// Domain reported by the server, or the URL host.
    pub domain: String,
    /// Server-side processing time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    /// Articles that received an AI summary.
    #[serde(default)]
    pub articles_with_summaries: u64,
}

impl HistoryEntry {
    /// Builds an entry from a completed extraction.
    pub fn from_extract(request: &ExtractRequest, response: &ExtractResponse) -> Self {
        Self::from_extract_at(request, response, Utc::now())
    }

    /// Builds an entry with an explicit timestamp.
    pub fn from_extract_at(
        request: &ExtractRequest,
        response: &ExtractResponse,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let domain = response
            .domain
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| host_of(&request.url))
            .unwrap_or_else(|| request.url.clone());

        let method = response
            .method_used
            .clone()
            .unwrap_or_else(|| request.method.to_string());

        Self {
            id: timestamp.timestamp_millis(),
            url: request.url.clone(),
            method,
            timestamp,
            articles_count: if response.total_articles > 0 {
                response.total_articles
            } else {
                response.articles.len() as u64
            },
            domain,
            processing_time: response.processing_time.as_ref().and_then(seconds),
            articles_with_summaries: response.articles_with_summaries,
        }
    }
}

fn host_of(raw: &str) -> Option<String> {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Reads a processing time given either as a number or a numeric string.
fn seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('s').trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// History Store
// ============================================================================

/// The most recent scraping runs.
#[derive(Debug, Clone)]
pub struct ScrapingHistory {
    entries: Arc<RwLock<VecDeque<HistoryEntry>>>,
    path: Option<PathBuf>,
}

impl Default for ScrapingHistory {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ScrapingHistory {
    /// Creates an empty history that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            path: None,
        }
    }

    /// Loads the history from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_history_path()).await
    }

    /// Loads the history from `path`. Missing or unreadable files start empty.
    pub async fn load(path: PathBuf) -> Self {
        let entries = read_entries(&path).await;
        Self {
            entries: Arc::new(RwLock::new(entries)),
            path: Some(path),
        }
    }

    /// Returns the backing file, if persisted.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records an entry at the front, dropping the oldest beyond the limit.
    ///
    /// The file is re-read first so entries recorded by other processes
    /// since this one loaded are kept.
    pub async fn record(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if let Some(path) = &self.path {
            *entries = read_entries(path).await;
        }
        entries.push_front(entry);
        entries.truncate(MAX_HISTORY_ENTRIES);

        match &self.path {
            Some(path) => save_json(path, &*entries).await,
            None => Ok(()),
        }
    }

    /// Returns all entries, newest first.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if there are no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Removes every entry.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        self.save().await?;
        info!("Scraping history cleared");
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let entries = self.entries.read().await;
        save_json(path, &*entries).await
    }
}

async fn read_entries(path: &Path) -> VecDeque<HistoryEntry> {
    let mut entries: VecDeque<HistoryEntry> = if path.exists() {
        load_json(path).await.unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load history, starting empty");
            VecDeque::new()
        })
    } else {
        debug!(path = %path.display(), "History file not found");
        VecDeque::new()
    };
    entries.truncate(MAX_HISTORY_ENTRIES);
    entries
}

// ============================================================================
// Tests
// ============================================================================
