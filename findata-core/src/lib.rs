// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `FinData` Core
//!
//! Core types, models, and the message catalog for the `FinData` client.
//!
//! This crate provides the foundational abstractions used across all other
//! `FinData` crates, including:
//!
//! - Session and user profile models
//! - The classified [`Outcome`] of a request
//! - Request/response payloads of the REST API
//! - The human-readable [`MessageCatalog`]
//!
//! ## Key Types
//!
//! ### Session Types
//! - [`Session`] - Either anonymous or a token paired with its user
//! - [`UserProfile`] - The profile returned by the login endpoint
//!
//! ### Outcome Types
//! - [`Outcome`] - Success, network failure, or HTTP failure
//! - [`FailureKind`] - Error taxonomy used for retry and user messaging
//!
//! ### Payloads
//! - [`LoginResponse`], [`StatsResponse`], [`AnalyticsResponse`],
//!   [`ExtractResponse`], [`HealthResponse`]

pub mod error;
pub mod messages;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export the message catalog
pub use messages::{ErrorMessage, MessageCatalog, SuccessMessage};

// Re-export all model types
pub use models::{
    // Session types
    Session,
    SubscriptionStatus,
    UserProfile,
    // Outcome types
    FailureKind,
    Outcome,
    // Payloads
    Ack,
    AnalyticsResponse,
    Article,
    ExtractRequest,
    ExtractResponse,
    HealthResponse,
    LoginRequest,
    LoginResponse,
    RegisterRequest,
    ScrapeMethod,
    StatsResponse,
};
