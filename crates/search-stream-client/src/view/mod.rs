//! Results display: the boundary the controller renders into.
//!
//! `HtmlView` keeps the results container as markup; `TerminalView` writes
//! lines to a terminal.
mod html;
mod terminal;

use std::fmt;

pub use html::{HtmlView, ResultsBlock};
pub use terminal::TerminalView;

/// Shown when a stream fails before anything was rendered.
pub const CONNECTION_FAILED_MESSAGE: &str = "Connection failed. Please try again.";

/// One line of the live execution log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEntry {
    /// Header naming the submitted query.
    SearchStarted { query: String },
    /// Empty spacer line.
    Blank,
    /// An execution log line from the server.
    Line(String),
    /// A planned step, numbered from 1.
    PlanStep { number: usize, step: String },
    /// Success banner.
    Completed,
    /// Error reported by the server.
    ServerError(String),
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchStarted { query } => write!(f, "🚀 Starting search for: {query}"),
            Self::Blank => Ok(()),
            Self::Line(line) => f.write_str(line),
            Self::PlanStep { number, step } => write!(f, "   Step {number}: {step}"),
            Self::Completed => f.write_str("🎉 Search completed successfully!"),
            Self::ServerError(error) => write!(f, "❌ Error: {error}"),
        }
    }
}

/// Run statistics shown under the final answer when enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub attempts: Option<u32>,
    pub flagged_sources: Vec<String>,
}

impl RunStatistics {
    /// Lines of the statistics footer.
    pub fn lines(&self) -> Vec<String> {
        let attempts = self
            .attempts
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let sources = if self.flagged_sources.is_empty() {
            "No sources flagged".to_string()
        } else {
            format!("Flagged sources: {}", self.flagged_sources.join(", "))
        };
        vec![format!("Attempts: {attempts}"), sources]
    }
}

/// Content of the final-answer section. The text is shown verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalAnswer {
    pub text: String,
    pub statistics: Option<RunStatistics>,
}

/// A display the controller can render search progress into.
pub trait ResultsView {
    /// Blocking user-facing notice (input validation).
    fn alert(&mut self, message: &str);
    /// Replaces the results with a loading indicator.
    fn show_loading(&mut self);
    /// Replaces the results with an error panel.
    fn show_error(&mut self, message: &str);
    /// Replaces the results with an empty live log container.
    fn open_log(&mut self);
    /// Appends one line to the live log container.
    fn append_log(&mut self, entry: LogEntry);
    /// Appends a final-answer section after the log container.
    fn append_final_answer(&mut self, answer: &FinalAnswer);
    /// Keeps the newest log line visible.
    fn scroll_to_bottom(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entries_render_like_the_web_client() {
        assert_eq!(
            LogEntry::SearchStarted { query: "rust".into() }.to_string(),
            "🚀 Starting search for: rust"
        );
        assert_eq!(
            LogEntry::PlanStep {
                number: 2,
                step: "b".into()
            }
            .to_string()
            .trim(),
            "Step 2: b"
        );
        assert_eq!(LogEntry::Blank.to_string(), "");
        assert_eq!(
            LogEntry::ServerError("timeout".into()).to_string(),
            "❌ Error: timeout"
        );
    }

    #[test]
    fn statistics_lines() {
        let stats = RunStatistics {
            attempts: Some(2),
            flagged_sources: vec!["a.com".into(), "b.org".into()],
        };
        assert_eq!(
            stats.lines(),
            vec!["Attempts: 2", "Flagged sources: a.com, b.org"]
        );
        assert_eq!(
            RunStatistics::default().lines(),
            vec!["Attempts: N/A", "No sources flagged"]
        );
    }
}
