//! Request descriptors.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::FetchError;

/// What to send, relative to the API base URL.
///
/// Built fresh for every logical call. The pipeline only borrows it, so it
/// cannot change once dispatched.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, e.g. `/auth/login`.
    pub path: String,
    /// JSON body.
    pub body: Option<Value>,
    /// Extra headers. The pipeline adds `Authorization` itself.
    pub headers: HeaderMap,
    /// Timeout override. `None` uses the configured default.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    /// Creates a descriptor without body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// A `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// A `POST` request with a serializable body.
    pub fn post_json<T: Serialize + ?Sized>(
        path: impl Into<String>,
        body: &T,
    ) -> Result<Self, FetchError> {
        Ok(Self::post(path, serde_json::to_value(body)?))
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Resolves the full URL below `base`.
    ///
    /// The base path is kept: `http://host/api` + `/auth/login` gives
    /// `http://host/api/auth/login`.
    pub fn url(&self, base: &Url) -> Result<Url, FetchError> {
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| FetchError::InvalidUrl {
            url: joined,
            reason: e.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_keeps_base_path() {
        let base = Url::parse("http://localhost:8080/api").unwrap();
        let request = RequestDescriptor::get("/dashboard/stats");
        assert_eq!(
            request.url(&base).unwrap().as_str(),
            "http://localhost:8080/api/dashboard/stats"
        );

        let base = Url::parse("https://findata.example.com/api/").unwrap();
        let request = RequestDescriptor::get("health");
        assert_eq!(
            request.url(&base).unwrap().as_str(),
            "https://findata.example.com/api/health"
        );
    }

    #[test]
    fn test_post_json() {
        #[derive(Serialize)]
        struct Login<'a> {
            username: &'a str,
        }

        let request = RequestDescriptor::post_json("/auth/login", &Login { username: "alice" })
            .unwrap()
            .with_timeout(Duration::from_secs(5));

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({"username": "alice"})));
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    }
}
