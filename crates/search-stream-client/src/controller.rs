use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::StreamFailure;
use crate::event::StreamEvent;
use crate::form::{Key, SearchForm};
use crate::render::{Disposition, EventRenderer};
use crate::session::{ActiveStream, SessionId, SessionMessage, SessionSignal};
use crate::source::EventSource;
use crate::view::{CONNECTION_FAILED_MESSAGE, ResultsView};

/// Submits searches and renders their progress stream into a view.
///
/// At most one stream is open at a time. Every signal from a session task is
/// tagged with its `SessionId`; signals from anything but the active session
/// are dropped, so a superseded stream can never touch the display.
///
/// `submit` spawns onto the current tokio runtime.
pub struct StreamSearchController<V> {
    source: Arc<dyn EventSource>,
    config: ClientConfig,
    view: V,
    form: SearchForm,
    renderer: EventRenderer,
    active: Option<ActiveStream>,
    tx: mpsc::Sender<SessionMessage>,
    rx: mpsc::Receiver<SessionMessage>,
}

impl<V: ResultsView> StreamSearchController<V> {
    pub fn new(source: Arc<dyn EventSource>, config: ClientConfig, view: V) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let renderer = EventRenderer::new(config.planning_node.clone());
        Self {
            source,
            config,
            view,
            form: SearchForm::default(),
            renderer,
            active: None,
            tx,
            rx,
        }
    }

    /// Adds run statistics under final answers.
    pub fn show_statistics(mut self, enabled: bool) -> Self {
        self.renderer = self.renderer.show_statistics(enabled);
        self
    }

    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Session of the open stream, if any.
    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|active| active.session_id)
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    /// Execution log entries already shown for the current session.
    pub fn last_log_count(&self) -> usize {
        self.renderer.last_log_count()
    }

    /// Validates the form and starts a new search, closing any open stream.
    ///
    /// Invalid input raises an alert and leaves the current stream untouched.
    pub fn submit(&mut self) -> Option<SessionId> {
        let request = match self.form.validate() {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "search input rejected");
                self.view.alert(&err.to_string());
                return None;
            }
        };

        self.close_active("superseded by a new search");
        self.view.show_loading();
        self.view.open_log();
        self.renderer.reset();

        let active = ActiveStream::open(
            self.source.clone(),
            request,
            self.config.idle_timeout,
            self.tx.clone(),
        );
        let session_id = active.session_id;
        info!(session_id = %session_id, query = %self.form.query(), max_attempts = %self.form.max_attempts(), "search submitted");
        self.active = Some(active);
        Some(session_id)
    }

    /// Key press in the query input; Enter submits.
    pub fn on_key(&mut self, key: Key) -> Option<SessionId> {
        if self.form.type_key(key) {
            self.submit()
        } else {
            None
        }
    }

    /// Closes the open stream without touching the display.
    ///
    /// Returns `false` when nothing was open.
    pub fn cancel(&mut self) -> bool {
        self.close_active("cancelled")
    }

    /// Waits for the next signal from any session task.
    ///
    /// Pends forever while no session is producing signals.
    pub async fn next_message(&mut self) -> Option<SessionMessage> {
        self.rx.recv().await
    }

    /// Applies one session signal to the display.
    pub fn handle_message(&mut self, message: SessionMessage) {
        if self.active_session() != Some(message.session_id) {
            debug!(session_id = %message.session_id, "dropping signal from inactive session");
            return;
        }
        match message.signal {
            SessionSignal::Message(payload) => match StreamEvent::parse(&payload) {
                Ok(event) => self.handle_event(&event),
                Err(failure) => self.handle_failure(failure),
            },
            SessionSignal::Failed(failure) => self.handle_failure(failure),
        }
    }

    /// Receives and applies one signal.
    pub async fn pump(&mut self) {
        if let Some(message) = self.next_message().await {
            self.handle_message(message);
        }
    }

    /// Processes signals until the active session ends.
    pub async fn run_until_idle(&mut self) {
        while self.is_streaming() {
            self.pump().await;
        }
    }

    fn handle_event(&mut self, event: &StreamEvent) {
        debug!(event_type = event.kind(), "stream event");
        let disposition = self.renderer.render(event, &mut self.view);
        self.view.scroll_to_bottom();
        if disposition == Disposition::Close {
            self.close_active(event.kind());
        }
    }

    fn handle_failure(&mut self, failure: StreamFailure) {
        let session_id = self.active_session();
        self.close_active("stream failed");
        if self.renderer.has_rendered_log() {
            warn!(session_id = ?session_id, error = %failure, "stream failed after partial progress");
        } else {
            warn!(session_id = ?session_id, error = %failure, "stream failed before any progress");
            self.view.show_error(CONNECTION_FAILED_MESSAGE);
        }
    }

    fn close_active(&mut self, reason: &str) -> bool {
        match self.active.take() {
            Some(active) => {
                debug!(session_id = %active.session_id, reason, "closing search stream");
                active.close();
                true
            }
            None => false,
        }
    }
}
