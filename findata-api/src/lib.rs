// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `FinData` API
//!
//! Typed service facade over the `FinData` REST API.
//!
//! A [`FinDataClient`] owns the request pipeline, the session store and the
//! auth notifier, and hands out one service per API area:
//!
//! | Service | Operations |
//! |---------|------------|
//! | [`AuthService`] | `login`, `logout`, `register`, `current_session` |
//! | [`DashboardService`] | `get_stats`, `get_analytics`, `overview` |
//! | [`ScrapingService`] | `extract_articles` |
//! | [`HealthService`] | `check_health` |
//!
//! Expected failures (validation, expired session, rate limiting, server
//! errors) come back as an [`ApiError`], never as a panic.
//!
//! ## Usage
//!
//! ```ignore
//! use findata_api::FinDataClient;
//! use findata_core::ExtractRequest;
//! use findata_store::AppConfig;
//!
//! let client = FinDataClient::builder(AppConfig::load()?).build()?;
//! client.auth().login("alice", "secret1").await?;
//!
//! let response = client
//!     .scraping()
//!     .extract_articles(ExtractRequest::new("example.com"))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod services;
pub mod validate;

pub use client::{ClientBuilder, FinDataClient};
pub use error::{ApiError, ValidationError};
pub use services::{
    AuthService, DashboardOverview, DashboardService, HealthService, MAX_ARTICLES_LIMIT,
    ScrapingService,
};
pub use validate::{Registration, validate_registration, validate_url};
