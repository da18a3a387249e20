use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{ClientError, TransportError};
use crate::form::SearchRequest;
use crate::source::{EventSource, MessageStream};
use crate::transport::SseDecoder;

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Error bodies longer than this are cut before being reported.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Event source reading `text/event-stream` responses over HTTP.
pub struct HttpEventSource {
    client: reqwest::Client,
    search_url: String,
}

impl HttpEventSource {
    /// Creates a source from client configuration.
    ///
    /// No overall request timeout is set: the stream is long-lived and the
    /// liveness window is enforced per message by the session task.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("search-stream/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            search_url: config.search_url(),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait::async_trait]
impl EventSource for HttpEventSource {
    async fn open(&self, request: &SearchRequest) -> Result<MessageStream, TransportError> {
        debug!(url = %self.search_url, max_attempts = request.max_attempts, "opening search stream");
        let response = self
            .client
            .get(&self.search_url)
            .query(&request.query_pairs())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| TransportError::connect(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(TransportError::status(status.as_u16(), body));
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(Box::pin(sse_message_stream(bytes_stream)))
    }
}

/// Decodes a body byte stream into message payloads.
pub(crate) fn sse_message_stream<E>(
    bytes_stream: Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, E>> + Send + 'static>>,
) -> impl futures::Stream<Item = Result<String, TransportError>> + Send
where
    E: std::fmt::Display + Send + 'static,
{
    struct State<E> {
        bytes_stream: Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, E>> + Send>>,
        decoder: SseDecoder,
        pending: VecDeque<String>,
        done: bool,
    }

    stream::try_unfold(
        State {
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(message) = state.pending.pop_front() {
                    return Ok(Some((message, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.decoder.push_chunk(&chunk)? {
                            if let Some(message) = frame.into_message() {
                                state.pending.push_back(message);
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Err(TransportError::read(e.to_string()));
                    }
                    None => {
                        if state.decoder.buffered_len() > 0 {
                            debug!(
                                bytes = state.decoder.buffered_len(),
                                "discarding incomplete trailing SSE frame"
                            );
                        }
                        state.done = true;
                    }
                }
            }
        },
    )
}
