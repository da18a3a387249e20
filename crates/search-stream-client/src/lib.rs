//! Client for streamed search progress.
//!
//! A [`StreamSearchController`] submits a query to the search endpoint, reads
//! the server-sent-event stream of workflow progress, and renders log lines,
//! plan steps and the final answer into a [`ResultsView`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use search_stream_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let config = ClientConfig::from_env()?;
//! let source = Arc::new(HttpEventSource::new(&config)?);
//! let mut controller =
//!     StreamSearchController::new(source, config, TerminalView::new(std::io::stdout()));
//!
//! controller.form_mut().set_query("latest developments in quantum computing");
//! controller.on_key(Key::Enter);
//! controller.run_until_idle().await;
//! # Ok(())
//! # }
//! ```

/// Client configuration and env loading.
pub mod config;
/// Controller owning the single active search stream.
pub mod controller;
/// Public error types.
pub mod errors;
/// Wire format of stream messages.
pub mod event;
/// Search form inputs and validation.
pub mod form;
/// HTTP event source.
pub mod http;
/// Logging setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Event-to-display rendering state machine.
pub mod render;
/// Session identity and the per-session stream task.
pub mod session;
/// Event source contract.
pub mod source;
/// SSE frame decoding.
pub mod transport;
/// Results display trait and implementations.
pub mod view;

pub use config::ClientConfig;
pub use controller::StreamSearchController;
pub use errors::{ClientError, InputError, StreamFailure, TransportError};
pub use event::StreamEvent;
pub use form::{Key, SearchForm, SearchRequest};
pub use http::HttpEventSource;
pub use render::{Disposition, EventRenderer};
pub use session::{SessionId, SessionMessage, SessionSignal};
pub use source::{EventSource, MessageStream};
pub use view::{FinalAnswer, HtmlView, LogEntry, ResultsView, TerminalView};
