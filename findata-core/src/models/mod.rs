//! Domain models for `FinData`.
//!
//! ## Submodules
//!
//! - [`session`] - Session and user profile
//! - [`outcome`] - Classified request outcome
//! - [`payloads`] - REST request/response bodies

mod outcome;
mod payloads;
mod session;

pub use outcome::{FailureKind, Outcome};
pub use payloads::{
    Ack, AnalyticsResponse, Article, ExtractRequest, ExtractResponse, HealthResponse,
    LoginRequest, LoginResponse, RegisterRequest, ScrapeMethod, StatsResponse,
};
pub use session::{Session, SubscriptionStatus, UserProfile};
