//! Turns stream events into results display updates.

use tracing::debug;

use crate::config::DEFAULT_PLANNING_NODE;
use crate::event::{CompletedData, NodeCompletedData, StreamEvent};
use crate::view::{FinalAnswer, LogEntry, ResultsView, RunStatistics};

/// What the controller should do with the stream after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    /// Terminal event rendered; close the stream.
    Close,
}

/// Per-session rendering state.
///
/// `last_log_count` is how many `execution_log` entries are already on
/// screen; only the suffix past it is ever appended.
#[derive(Clone, Debug)]
pub struct EventRenderer {
    planning_node: String,
    show_statistics: bool,
    last_log_count: usize,
    log_lines_rendered: usize,
}

impl Default for EventRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_PLANNING_NODE)
    }
}

impl EventRenderer {
    pub fn new(planning_node: impl Into<String>) -> Self {
        Self {
            planning_node: planning_node.into(),
            show_statistics: false,
            last_log_count: 0,
            log_lines_rendered: 0,
        }
    }

    /// Adds the attempts / flagged-sources footer to final answers.
    pub fn show_statistics(mut self, enabled: bool) -> Self {
        self.show_statistics = enabled;
        self
    }

    /// Forgets everything rendered for the previous session.
    pub fn reset(&mut self) {
        self.last_log_count = 0;
        self.log_lines_rendered = 0;
    }

    pub fn last_log_count(&self) -> usize {
        self.last_log_count
    }

    /// Whether any execution log or plan line was rendered this session.
    pub fn has_rendered_log(&self) -> bool {
        self.log_lines_rendered > 0
    }

    /// Renders one event. Does not scroll; the caller follows the tail.
    pub fn render(&mut self, event: &StreamEvent, view: &mut impl ResultsView) -> Disposition {
        match event {
            StreamEvent::Started { data } => {
                view.append_log(LogEntry::SearchStarted {
                    query: data.query.clone(),
                });
                view.append_log(LogEntry::Blank);
                self.last_log_count = 0;
                Disposition::Continue
            }
            StreamEvent::NodeCompleted { node_name, data } => {
                self.render_node(node_name.as_deref(), data, view);
                Disposition::Continue
            }
            StreamEvent::Completed { data } => {
                view.append_log(LogEntry::Completed);
                view.append_final_answer(&self.final_answer(data));
                Disposition::Close
            }
            StreamEvent::Error { data } => {
                view.append_log(LogEntry::ServerError(data.error.clone()));
                Disposition::Close
            }
        }
    }

    fn render_node(
        &mut self,
        node_name: Option<&str>,
        data: &NodeCompletedData,
        view: &mut impl ResultsView,
    ) {
        debug!(
            node = node_name.unwrap_or("<unnamed>"),
            attempt = data.attempt,
            log_len = data.execution_log.len(),
            search_results_length = data.search_results_length,
            "node completed"
        );

        if let Some(new_lines) = data.execution_log.get(self.last_log_count..)
            && !new_lines.is_empty()
        {
            for line in new_lines {
                view.append_log(LogEntry::Line(line.clone()));
            }
            self.log_lines_rendered += new_lines.len();
            self.last_log_count = data.execution_log.len();
        }

        // Re-rendered on every planning event; servers send it once.
        if node_name == Some(self.planning_node.as_str()) && !data.plan.is_empty() {
            for (idx, step) in data.plan.iter().enumerate() {
                view.append_log(LogEntry::PlanStep {
                    number: idx + 1,
                    step: step.clone(),
                });
            }
            view.append_log(LogEntry::Blank);
            self.log_lines_rendered += data.plan.len();
        }
    }

    fn final_answer(&self, data: &CompletedData) -> FinalAnswer {
        FinalAnswer {
            text: data.final_answer.clone(),
            statistics: self.show_statistics.then(|| RunStatistics {
                attempts: data.attempts,
                flagged_sources: data.flagged_sources.clone(),
            }),
        }
    }
}
