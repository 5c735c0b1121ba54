// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `FinData` Fetch
//!
//! The request pipeline of the `FinData` client.
//!
//! Every request to the API goes through a [`RequestPipeline`], which:
//!
//! - attaches the session's bearer token, captured once per logical call
//! - applies the per-request timeout
//! - classifies the answer into an [`Outcome`](findata_core::Outcome)
//! - tears the session down on the first 401 of a call
//! - retries server and network failures with linear backoff
//!
//! ## Host APIs
//!
//! The [`host`] module holds the swappable seams:
//!
//! - [`host::http`] - [`Transport`] trait and the reqwest implementation
//! - [`host::navigator`] - Where to go once the session is gone
//!
//! ## Example
//!
//! ```ignore
//! use findata_fetch::{RequestDescriptor, RequestPipeline};
//! use findata_store::{AppConfig, SessionStore};
//!
//! let config = AppConfig::load()?;
//! let pipeline = RequestPipeline::builder(SessionStore::in_memory())
//!     .config(&config)
//!     .build()?;
//!
//! let outcome = pipeline.execute(&RequestDescriptor::get("/health")).await?;
//! ```

pub mod builder;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod request;
pub mod retry;

// Errors
pub use error::{FetchError, TransportError};

// Host APIs
pub use host::{
    HttpRequest, HttpResponse, LoggingNavigator, Navigator, RecordingNavigator, ReqwestTransport,
    Transport,
};

// Pipeline
pub use builder::PipelineBuilder;
pub use pipeline::{CallReport, CallResult, RequestPipeline};
pub use request::RequestDescriptor;
pub use retry::{Retried, RetryStrategy, Retryable, with_retry};
