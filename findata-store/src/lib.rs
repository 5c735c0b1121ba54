// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `FinData` Store
//!
//! Configuration and client-side state for the `FinData` client.
//!
//! This crate provides:
//!
//! - **AppConfig**: Layered configuration (defaults, config file, environment)
//! - **SessionStore**: The persisted token/user pair on a storage medium
//! - **AuthNotifier**: Local and cross-context auth transition signals
//! - **ScrapingHistory**: The most recent extractions
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use findata_store::{AuthNotifier, MemoryMedium, SessionStore, StorageKeys};
//! use std::sync::Arc;
//!
//! let medium = MemoryMedium::new();
//! let tab = Arc::new(medium.context());
//! let session = SessionStore::new(tab.clone());
//!
//! let notifier = AuthNotifier::new();
//! notifier.attach(tab.as_ref(), StorageKeys::default());
//! notifier.subscribe(|_| println!("Session may have changed"));
//!
//! session.clear()?;
//! notifier.notify_local();
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod notifier;
pub mod persistence;
pub mod session_store;
pub mod storage;

pub use config::{AppConfig, ConfigFile, StorageKeys, ValidationRules};
pub use error::{ConfigError, StoreError};
pub use history::{HistoryEntry, ScrapingHistory};
pub use notifier::{AuthNotifier, AuthTransition, SubscriptionId, TransitionSource};
pub use persistence::{
    default_config_dir, default_config_path, default_data_dir, default_history_path,
    default_session_path, load_json, load_json_or_default, save_json,
};
pub use session_store::SessionStore;
pub use storage::{
    ChangeStream, ContextId, FileStorage, MemoryMedium, MemoryStorage, StorageBackend,
    StorageChange,
};
