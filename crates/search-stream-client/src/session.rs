use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::{StreamFailure, TransportError};
use crate::form::SearchRequest;
use crate::source::{EventSource, MessageStream};

/// Identity of one search, from submission to stream closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a session task reports to the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSignal {
    /// Raw `data:` payload of one message.
    Message(String),
    /// The stream failed; the task has already stopped.
    Failed(StreamFailure),
}

/// A signal tagged with the session whose stream produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionMessage {
    pub session_id: SessionId,
    pub signal: SessionSignal,
}

/// Handle used to stop a session task.
///
/// Dropping the handle stops the task too.
pub(crate) struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests the session task to stop and drop its connection.
    pub(crate) fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// The single open stream of the controller (`currentStream`).
pub(crate) struct ActiveStream {
    pub(crate) session_id: SessionId,
    abort: AbortHandle,
    task: JoinHandle<()>,
}

impl ActiveStream {
    /// Spawns the task reading this session's stream.
    pub(crate) fn open(
        source: Arc<dyn EventSource>,
        request: SearchRequest,
        idle_timeout: Option<Duration>,
        tx: mpsc::Sender<SessionMessage>,
    ) -> Self {
        let session_id = SessionId::new();
        let (abort_tx, abort_rx) = watch::channel(false);
        let task = tokio::spawn(run_session(
            source,
            request,
            session_id,
            idle_timeout,
            tx,
            abort_rx,
        ));
        Self {
            session_id,
            abort: AbortHandle { tx: abort_tx },
            task,
        }
    }

    /// Stops the task even if it is parked on a full signal channel.
    pub(crate) fn close(self) {
        self.abort.abort();
        self.task.abort();
    }
}

async fn run_session(
    source: Arc<dyn EventSource>,
    request: SearchRequest,
    session_id: SessionId,
    idle_timeout: Option<Duration>,
    tx: mpsc::Sender<SessionMessage>,
    mut abort_rx: watch::Receiver<bool>,
) {
    let opened = tokio::select! {
        _ = cancelled(&mut abort_rx) => {
            debug!(session_id = %session_id, "session closed while connecting");
            return;
        }
        opened = open_stream(source.as_ref(), &request, idle_timeout) => opened,
    };
    let mut messages = match opened {
        Ok(messages) => messages,
        Err(err) => {
            send_signal(&tx, session_id, SessionSignal::Failed(err.into())).await;
            return;
        }
    };
    info!(session_id = %session_id, "search stream open");

    loop {
        let next = tokio::select! {
            _ = cancelled(&mut abort_rx) => {
                debug!(session_id = %session_id, "session closed, dropping stream");
                return;
            }
            next = next_message(&mut messages, idle_timeout) => next,
        };
        let signal = match next {
            Ok(data) => SessionSignal::Message(data),
            Err(err) => SessionSignal::Failed(err.into()),
        };
        let failed = matches!(signal, SessionSignal::Failed(_));
        if !send_signal(&tx, session_id, signal).await || failed {
            return;
        }
    }
}

/// Waiting for response headers counts against the same liveness window.
async fn open_stream(
    source: &dyn EventSource,
    request: &SearchRequest,
    idle_timeout: Option<Duration>,
) -> Result<MessageStream, TransportError> {
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, source.open(request))
            .await
            .map_err(|_| TransportError::Timeout(limit))?,
        None => source.open(request).await,
    }
}

async fn next_message(
    messages: &mut MessageStream,
    idle_timeout: Option<Duration>,
) -> Result<String, TransportError> {
    let next = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, messages.next())
            .await
            .map_err(|_| TransportError::Timeout(limit))?,
        None => messages.next().await,
    };
    next.unwrap_or(Err(TransportError::Closed))
}

/// Resolves once an abort is requested or the handle is dropped.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn send_signal(
    tx: &mpsc::Sender<SessionMessage>,
    session_id: SessionId,
    signal: SessionSignal,
) -> bool {
    tx.send(SessionMessage { session_id, signal }).await.is_ok()
}
