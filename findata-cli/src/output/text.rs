//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Local, Utc};
use findata_core::{
    AnalyticsResponse, ExtractResponse, HealthResponse, Session, StatsResponse,
};
use findata_store::{AuthTransition, HistoryEntry};
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats the stored session.
    pub fn format_session(&self, session: &Session) -> String {
        let Some(user) = session.user() else {
            return self.dim("Not logged in");
        };

        let mut lines = vec![format!("Logged in as {}", self.bold(&user.username))];
        if let Some(email) = &user.email {
            lines.push(format!("Email: {}", self.cyan(email)));
        }
        if let Some(role) = &user.role {
            lines.push(format!("Role:  {role}"));
        }
        if let Some(plan) = user.subscription.as_ref().and_then(|s| s.plan.as_deref()) {
            lines.push(format!("Plan:  {plan}"));
        }
        lines.join("\n")
    }

    /// Formats dashboard counters.
    pub fn format_stats(&self, stats: &StatsResponse) -> String {
        let mut lines = vec![self.bold("Dashboard"), "─".repeat(40)];

        let total = stats.total_scraping().unwrap_or(0);
        let limit = stats
            .user_stats
            .get("scraping_limit")
            .and_then(Value::as_u64);
        match limit {
            Some(limit) if limit > 0 => {
                #[allow(clippy::cast_precision_loss)]
                let remaining = 100.0 - (total as f64 / limit as f64 * 100.0).min(100.0);
                lines.push(format!(
                    "{:<10} {} {}",
                    "Runs:",
                    self.progress_bar(remaining),
                    self.color_for_percent(remaining, &format!("{total}/{limit}"))
                ));
            }
            _ => lines.push(format!("{:<10} {}", "Runs:", self.format_number(total))),
        }

        lines.push(format!(
            "{:<10} {}",
            "Articles:",
            self.format_number(stats.total_articles().unwrap_or(0))
        ));
        if let Some(avg) = stats
            .user_stats
            .get("avg_articles_per_scraping")
            .and_then(Value::as_f64)
        {
            lines.push(format!("{:<10} {avg:.1} per run", "Average:"));
        }
        if let Some(plan) = stats.subscription.get("plan").and_then(Value::as_str) {
            lines.push(format!("{:<10} {}", "Plan:", self.cyan(plan)));
        }

        lines.join("\n")
    }

    /// Formats per-domain aggregates and recent runs.
    pub fn format_analytics(&self, analytics: &AnalyticsResponse) -> String {
        let mut lines = vec![self.bold("Analytics"), "─".repeat(40)];

        if analytics.domain_stats.is_empty() {
            lines.push(self.dim("No domains scraped yet"));
        }
        for domain in analytics.domain_stats.iter().take(10) {
            let name = domain.get("domain").and_then(Value::as_str).unwrap_or("?");
            let count = domain
                .get("requests_count")
                .or_else(|| domain.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            lines.push(format!("{name:<30} {:>6}", self.format_number(count)));
        }

        let runs = analytics.scraping_history.len();
        if runs > 0 {
            lines.push(String::new());
            lines.push(format!(
                "Recent runs: {} ({} successful)",
                runs,
                self.green(&analytics.successful_runs().to_string())
            ));
        }

        lines.join("\n")
    }

    /// Formats an extraction result.
    pub fn format_extract(&self, response: &ExtractResponse) -> String {
        let domain = response.domain.as_deref().unwrap_or("site");
        let mut header = format!(
            "{} articles from {}",
            self.bold(&response.articles.len().to_string()),
            self.cyan(domain)
        );
        if let Some(method) = &response.method_used {
            header.push_str(&format!(" via {method}"));
        }
        if let Some(time) = response.processing_time.as_ref().and_then(display_value) {
            header.push_str(&self.dim(&format!(" ({time})")));
        }

        let mut lines = vec![header, "─".repeat(40)];
        for (index, article) in response.articles.iter().enumerate() {
            lines.push(format!("{:>2}. {}", index + 1, self.bold(&article.title)));
            if let Some(url) = &article.url {
                lines.push(format!("    {}", self.dim(url)));
            }
            if let Some(summary) = &article.resume {
                lines.push(format!("    {summary}"));
            }
        }
        if response.articles_with_summaries > 0 {
            lines.push(String::new());
            lines.push(format!(
                "{} with AI summaries",
                self.green(&response.articles_with_summaries.to_string())
            ));
        }

        lines.join("\n")
    }

    /// Formats backend health.
    pub fn format_health(&self, health: &HealthResponse) -> String {
        let status = if health.is_healthy() {
            self.green(&format!("✓ {}", health.status))
        } else {
            self.yellow(&format!("! {}", health.status))
        };
        format!("Backend: {status}")
    }

    /// Formats the local extraction history, newest first.
    pub fn format_history(&self, entries: &[HistoryEntry]) -> String {
        if entries.is_empty() {
            return self.dim("No extractions yet");
        }

        let mut lines = Vec::new();
        for entry in entries {
            let when = entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            let mut line = format!(
                "{} {:<24} {:>4} articles  {}",
                self.dim(&when.to_string()),
                entry.domain,
                entry.articles_count,
                entry.method
            );
            if let Some(secs) = entry.processing_time {
                line.push_str(&self.dim(&format!("  {secs:.1}s")));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Formats one auth transition for `watch`.
    pub fn format_transition(
        &self,
        transition: AuthTransition,
        session: &Session,
        at: DateTime<Utc>,
    ) -> String {
        let state = match session.user() {
            Some(user) => self.green(&format!("logged in as {}", user.username)),
            None => self.red("logged out"),
        };
        format!(
            "{} [{}] {}",
            self.dim(&at.with_timezone(&Local).format("%H:%M:%S").to_string()),
            transition.source,
            state
        )
    }

    /// Formats an error message.
    pub fn format_error(&self, context: &str, error: &str) -> String {
        format!("{}: {} - {}", self.bold(context), self.red("Error"), error)
    }

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = ((percent_remaining / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::unused_self)]
    fn format_number(&self, n: u64) -> String {
        let n = n as f64;
        if n >= 1_000_000.0 {
            format!("{:.1}M", n / 1_000_000.0)
        } else if n >= 1_000.0 {
            format!("{:.1}K", n / 1_000.0)
        } else {
            format!("{n:.0}")
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Renders a scalar JSON value without quotes.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format!("{n}s")),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
