use serde::{Deserialize, Serialize};

use crate::errors::StreamFailure;

/// One message of the search progress stream, tagged by `event_type`.
///
/// Unknown payload fields are ignored so newer servers stay readable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Server accepted the query and began executing.
    Started { data: StartedData },
    /// A workflow node finished; carries the cumulative execution log.
    NodeCompleted {
        #[serde(default)]
        node_name: Option<String>,
        data: NodeCompletedData,
    },
    /// Terminal success with the final answer.
    Completed { data: CompletedData },
    /// Terminal failure reported by the server.
    Error { data: ErrorData },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartedData {
    pub query: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCompletedData {
    /// Every log line produced so far in this run, oldest first.
    #[serde(default)]
    pub execution_log: Vec<String>,
    /// Planned search steps; only meaningful on the planning node.
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub attempt: Option<u32>,
    #[serde(default)]
    pub search_results_length: Option<usize>,
    #[serde(default)]
    pub summary_status: Option<String>,
    #[serde(default)]
    pub final_answer: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletedData {
    pub final_answer: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub execution_log: Vec<String>,
    #[serde(default)]
    pub attempts: Option<u32>,
    #[serde(default)]
    pub flagged_sources: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    pub error: String,
}

impl StreamEvent {
    /// Parses the `data:` payload of one SSE message.
    pub fn parse(payload: &str) -> Result<Self, StreamFailure> {
        serde_json::from_str(payload).map_err(|e| StreamFailure::malformed(e.to_string()))
    }

    /// Wire name of the event type, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::NodeCompleted { .. } => "node_completed",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
        }
    }

    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }
}
