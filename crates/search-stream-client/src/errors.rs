use std::time::Duration;

/// Failures reported by an event source while opening or reading a stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent (DNS, connect, TLS, ...).
    #[error("connection failed: {0}")]
    Connect(String),
    /// Server answered the stream request with a non-success status.
    #[error("search request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// Reading the response body failed mid-stream.
    #[error("stream read failed: {0}")]
    Read(String),
    /// No message arrived within the liveness window.
    #[error("no stream activity for {}s", .0.as_secs())]
    Timeout(Duration),
    /// Server closed the stream before sending a terminal event.
    #[error("stream closed before a terminal event")]
    Closed,
}

impl TransportError {
    /// Creates a connect-level error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    /// Creates a status error from the response code and (possibly truncated) body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Creates a mid-stream read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }
}

/// Reason a session ended without a terminal `completed`/`error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamFailure {
    /// Transport-level failure of the connection.
    #[error(transparent)]
    Transport(TransportError),
    /// Message payload was not valid JSON or violated the event schema.
    ///
    /// Handled exactly like a transport failure by the controller.
    #[error("malformed stream message: {message}")]
    Malformed { message: String },
}

impl StreamFailure {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<TransportError> for StreamFailure {
    fn from(value: TransportError) -> Self {
        StreamFailure::Transport(value)
    }
}

/// Form validation failures. The `Display` text is what the user is alerted with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Please enter a search query")]
    EmptyQuery,
    #[error("Search query must be at most {max} characters")]
    QueryTooLong { max: usize },
    #[error("Max attempts must be a whole number between {min} and {max}")]
    InvalidMaxAttempts { min: u8, max: u8 },
}

/// Top-level error type for the public client API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid user input.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Transport error surfaced outside a running session.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_text_is_the_alert_message() {
        assert_eq!(
            InputError::EmptyQuery.to_string(),
            "Please enter a search query"
        );
        assert_eq!(
            InputError::InvalidMaxAttempts { min: 1, max: 5 }.to_string(),
            "Max attempts must be a whole number between 1 and 5"
        );
    }

    #[test]
    fn transport_failure_is_transparent() {
        let failure = StreamFailure::from(TransportError::Closed);
        assert_eq!(failure.to_string(), "stream closed before a terminal event");
        assert_eq!(
            TransportError::Timeout(Duration::from_secs(30)).to_string(),
            "no stream activity for 30s"
        );
    }
}
