//! Common imports for typical client usage.
pub use crate::{
    ClientConfig, ClientError, EventSource, HtmlView, HttpEventSource, Key, ResultsView,
    SearchForm, SessionId, StreamEvent, StreamSearchController, TerminalView,
};
