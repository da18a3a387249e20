use std::fmt::Write as _;

use super::{FinalAnswer, LogEntry, ResultsView};

/// One top-level section of the results container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultsBlock {
    Loading,
    Error(String),
    Log(Vec<LogEntry>),
    FinalAnswer(FinalAnswer),
}

/// In-memory results container serialised to the web client's markup.
///
/// Server strings are inserted as-is, matching the page's `innerHTML` writes.
#[derive(Clone, Debug, Default)]
pub struct HtmlView {
    blocks: Vec<ResultsBlock>,
    alerts: Vec<String>,
    scrolls: usize,
}

impl HtmlView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[ResultsBlock] {
        &self.blocks
    }

    /// Alerts raised so far, oldest first.
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Removes and returns pending alerts.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// Entries of the live log container, empty when there is none.
    pub fn log_entries(&self) -> &[LogEntry] {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| match block {
                ResultsBlock::Log(entries) => Some(entries.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn final_answers(&self) -> Vec<&FinalAnswer> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ResultsBlock::FinalAnswer(answer) => Some(answer),
                _ => None,
            })
            .collect()
    }

    /// Number of follow-tail requests.
    pub fn scroll_count(&self) -> usize {
        self.scrolls
    }

    /// Inner markup of the results container.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                ResultsBlock::Loading => out.push_str(
                    "<div class=\"loading\">\n    <h3>🚀 Starting search...</h3>\n    <p>Please wait while we process your query...</p>\n</div>\n",
                ),
                ResultsBlock::Error(message) => {
                    let _ = writeln!(
                        out,
                        "<div class=\"error\">\n    <h3>❌ Error</h3>\n    <p>{message}</p>\n</div>"
                    );
                }
                ResultsBlock::Log(entries) => {
                    out.push_str("<div class=\"result-section\">\n    <h3>🔍 Execution Log (Live)</h3>\n    <div id=\"streamingUpdates\" class=\"execution-log\">");
                    for entry in entries {
                        out.push_str(&entry_html(entry));
                    }
                    out.push_str("</div>\n</div>\n");
                }
                ResultsBlock::FinalAnswer(answer) => {
                    out.push_str("<div class=\"result-section\">\n    <h3>📝 Final Answer</h3>\n");
                    let _ = writeln!(out, "    <div class=\"final-answer\">{}</div>", answer.text);
                    if let Some(stats) = &answer.statistics {
                        out.push_str("    <div class=\"statistics\">");
                        for line in stats.lines() {
                            let _ = write!(out, "<div>{line}</div>");
                        }
                        out.push_str("</div>\n");
                    }
                    out.push_str("</div>\n");
                }
            }
        }
        out
    }
}

fn entry_html(entry: &LogEntry) -> String {
    match entry {
        LogEntry::Completed => format!("<div><strong>{entry}</strong></div>"),
        LogEntry::ServerError(_) => format!("<div style=\"color: #c62828;\">{entry}</div>"),
        _ => format!("<div>{entry}</div>"),
    }
}

impl ResultsView for HtmlView {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn show_loading(&mut self) {
        self.blocks = vec![ResultsBlock::Loading];
    }

    fn show_error(&mut self, message: &str) {
        self.blocks = vec![ResultsBlock::Error(message.to_string())];
    }

    fn open_log(&mut self) {
        self.blocks = vec![ResultsBlock::Log(Vec::new())];
    }

    fn append_log(&mut self, entry: LogEntry) {
        let log = self.blocks.iter_mut().rev().find_map(|block| match block {
            ResultsBlock::Log(entries) => Some(entries),
            _ => None,
        });
        match log {
            Some(entries) => entries.push(entry),
            None => self.blocks.push(ResultsBlock::Log(vec![entry])),
        }
    }

    fn append_final_answer(&mut self, answer: &FinalAnswer) {
        self.blocks.push(ResultsBlock::FinalAnswer(answer.clone()));
    }

    fn scroll_to_bottom(&mut self) {
        self.scrolls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::RunStatistics;

    #[test]
    fn replacing_operations_reset_the_container() {
        let mut view = HtmlView::new();
        view.show_loading();
        assert_eq!(view.blocks(), &[ResultsBlock::Loading]);
        view.open_log();
        view.append_log(LogEntry::Line("one".into()));
        view.show_error("boom");
        assert_eq!(view.blocks(), &[ResultsBlock::Error("boom".into())]);
        assert!(view.log_entries().is_empty());
    }

    #[test]
    fn final_answer_is_appended_after_the_log() {
        let mut view = HtmlView::new();
        view.open_log();
        view.append_log(LogEntry::Completed);
        view.append_final_answer(&FinalAnswer {
            text: "<b>42</b>".into(),
            statistics: None,
        });
        let html = view.to_html();
        let log_at = html.find("streamingUpdates").expect("log container");
        let answer_at = html
            .find("<div class=\"final-answer\"><b>42</b></div>")
            .expect("verbatim answer");
        assert!(log_at < answer_at);
        assert!(html.contains("<div><strong>🎉 Search completed successfully!</strong></div>"));
        assert_eq!(view.log_entries(), &[LogEntry::Completed]);
    }

    #[test]
    fn log_markup_matches_entry_kinds() {
        let mut view = HtmlView::new();
        view.open_log();
        view.append_log(LogEntry::Line("fetched".into()));
        view.append_log(LogEntry::Blank);
        view.append_log(LogEntry::ServerError("timeout".into()));
        let html = view.to_html();
        assert!(html.contains(
            "<div>fetched</div><div></div><div style=\"color: #c62828;\">❌ Error: timeout</div>"
        ));
    }

    #[test]
    fn statistics_render_inside_the_answer_section() {
        let mut view = HtmlView::new();
        view.append_final_answer(&FinalAnswer {
            text: "done".into(),
            statistics: Some(RunStatistics {
                attempts: Some(1),
                flagged_sources: vec![],
            }),
        });
        let html = view.to_html();
        assert!(html.contains("<div>Attempts: 1</div><div>No sources flagged</div>"));
        assert_eq!(view.final_answers().len(), 1);
    }

    #[test]
    fn alerts_are_collected_separately() {
        let mut view = HtmlView::new();
        view.alert("Please enter a search query");
        assert!(view.blocks().is_empty());
        assert_eq!(view.take_alerts(), vec!["Please enter a search query"]);
        assert!(view.alerts().is_empty());
    }
}
