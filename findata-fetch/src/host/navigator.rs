//! Navigation after a session teardown.

use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Moves the user interface to another route.
pub trait Navigator: Send + Sync {
    /// Performs a hard navigation to `route`.
    fn navigate(&self, route: &str);
}

/// Navigator that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigating to landing route");
    }
}

/// Navigator that remembers every route it was sent to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes navigated to, oldest first.
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator() {
        let navigator = RecordingNavigator::new();
        navigator.navigate("/");
        navigator.navigate("/login");
        assert_eq!(navigator.routes(), vec!["/", "/login"]);
    }
}
