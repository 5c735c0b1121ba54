//! Where the CLI "goes" once the session is torn down.

use findata_fetch::Navigator;

/// Prints a notice instead of navigating.
pub struct NoticeNavigator {
    quiet: bool,
    use_colors: bool,
}

impl NoticeNavigator {
    /// Creates a navigator. A quiet one prints nothing.
    pub fn new(quiet: bool, use_colors: bool) -> Self {
        Self { quiet, use_colors }
    }

    /// Notice printed for `route`.
    pub fn notice(&self, route: &str) -> String {
        let text = if route == "/" {
            "Session expired, run `findata login` to sign in again".to_string()
        } else {
            format!("Session ended, continue at {route}")
        };
        if self.use_colors {
            format!("\x1b[33m{text}\x1b[0m")
        } else {
            text
        }
    }
}

impl Navigator for NoticeNavigator {
    fn navigate(&self, route: &str) {
        if !self.quiet {
            eprintln!("{}", self.notice(route));
        }
    }
}
