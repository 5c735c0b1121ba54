//! Output formatting for CLI.

mod json;
mod text;

pub use json::{ErrorOutput, JsonFormatter, SessionOutput};
pub use text::TextFormatter;
