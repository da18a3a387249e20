use std::fmt::Display;
use std::io::Write;

use tracing::warn;

use super::{FinalAnswer, LogEntry, ResultsView};

const RULE_WIDTH: usize = 70;

/// Line-oriented results display for terminals.
///
/// Alerts go to `alerts` (stderr in the CLI), everything else to `out`.
pub struct TerminalView<W: Write, A: Write = std::io::Stderr> {
    out: W,
    alerts: A,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self::with_alerts(out, std::io::stderr())
    }
}

impl<W: Write, A: Write> TerminalView<W, A> {
    pub fn with_alerts(out: W, alerts: A) -> Self {
        Self { out, alerts }
    }

    pub fn into_inner(self) -> (W, A) {
        (self.out, self.alerts)
    }

    fn line(&mut self, text: impl Display) {
        if let Err(e) = writeln!(self.out, "{text}") {
            warn!(error = %e, "failed to write results line");
        }
    }

    fn rule(&mut self) {
        self.line("─".repeat(RULE_WIDTH));
    }

    fn heading(&mut self, title: &str) {
        self.rule();
        self.line(title);
        self.rule();
    }
}

impl<W: Write, A: Write> ResultsView for TerminalView<W, A> {
    fn alert(&mut self, message: &str) {
        if let Err(e) = writeln!(self.alerts, "⚠️  {message}") {
            warn!(error = %e, "failed to write alert");
        }
    }

    fn show_loading(&mut self) {
        self.line("🚀 Starting search...");
        self.line("Please wait while we process your query...");
    }

    fn show_error(&mut self, message: &str) {
        self.line("❌ Error");
        self.line(message);
    }

    fn open_log(&mut self) {
        self.heading("🔍 Execution Log (Live)");
    }

    fn append_log(&mut self, entry: LogEntry) {
        self.line(entry);
    }

    fn append_final_answer(&mut self, answer: &FinalAnswer) {
        self.line("");
        self.heading("📝 Final Answer");
        self.line(&answer.text);
        if let Some(stats) = &answer.statistics {
            self.line("");
            self.heading("STATISTICS");
            for line in stats.lines() {
                self.line(line);
            }
        }
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "failed to flush results");
        }
    }
}
