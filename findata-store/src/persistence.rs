//! File persistence helpers.
//!
//! Handles loading and saving state to disk with proper security.

use serde::{Serialize, de::DeserializeOwned};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/findata`
/// - Linux: `~/.config/findata`
/// - Windows: `%APPDATA%\findata`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("findata"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default data directory.
///
/// - macOS: `~/Library/Application Support/findata`
/// - Linux: `~/.local/share/findata`
/// - Windows: `%APPDATA%\findata`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("findata"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Returns the default persisted session path.
pub fn default_session_path() -> PathBuf {
    default_config_dir().join("session.json")
}

/// Returns the default scraping history path.
pub fn default_history_path() -> PathBuf {
    default_data_dir().join("history.json")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets restrictive file permissions (0o600) on Unix systems.
///
/// The session file holds a bearer token, so only the owner may read it.
#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// Sets restrictive directory permissions (0o700) on Unix systems.
#[cfg(unix)]
fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o700);
    std::fs::set_permissions(path, perms)?;

    debug!(path = %path.display(), mode = "0700", "Set restrictive directory permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
fn set_restrictive_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Creates the parent directory of `path` with restrictive permissions.
fn create_secure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(path = %parent.display(), "Creating secure directory");
            std::fs::create_dir_all(parent)?;
            set_restrictive_dir_permissions(parent)?;
        }
    }
    Ok(())
}

/// Writes `contents` to `path` atomically (temp file + rename) with 0600
/// permissions on Unix.
///
/// Readers observe either the old or the new file, never a partial write.
/// Every call gets its own temp file, so concurrent writers (other threads
/// or other processes) never share one.
pub fn write_private(path: &Path, contents: &str) -> Result<(), StoreError> {
    create_secure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Created 0600 on Unix
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    set_restrictive_permissions(temp.path())?;
    temp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    Ok(())
}

/// Saves data to a JSON file with secure permissions.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    let json = serde_json::to_string_pretty(data)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_private(&path, &json))
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;

    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    Ok(data)
}

/// Loads data from a JSON file, returning default if not found.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !matches!(e, StoreError::Io(_)) {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

/// Ensures a directory exists with secure permissions.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        set_restrictive_dir_permissions(path)?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
