//! Host APIs used by the request pipeline.
//!
//! - [`http`] - Network transport (reqwest)
//! - [`navigator`] - Route changes after a session teardown
//!
//! Both are traits so tests and embedders can swap them out.

pub mod http;
pub mod navigator;

pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use navigator::{LoggingNavigator, Navigator, RecordingNavigator};
