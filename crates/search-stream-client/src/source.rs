use std::pin::Pin;

use crate::errors::TransportError;
use crate::form::SearchRequest;

/// Stream of raw `data:` payloads, in arrival order.
pub type MessageStream =
    Pin<Box<dyn futures::Stream<Item = Result<String, TransportError>> + Send + 'static>>;

/// Opens the server's progress stream for a search.
///
/// The HTTP implementation is [`crate::http::HttpEventSource`]; tests plug in
/// scripted sources.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Opens one stream. Errors here count as transport errors of the session.
    async fn open(&self, request: &SearchRequest) -> Result<MessageStream, TransportError>;
}
