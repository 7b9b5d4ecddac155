//! Control-channel session.
//!
//! A [`ControlSession`] owns at most one websocket link. The link task is the
//! only code touching the socket; everything else talks to it through the
//! outbound queue stored in the session state.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use shared::protocol::{ControlFrame, InboundMessage, FRAME_TERMINATOR};
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::{error::ControlError, notify::Notifier, sanitize::sanitize_frame};

pub const CONNECTION_ERROR_TEXT: &str = "Websocket connection error";

/// Receives every inbound message that is neither malformed nor a heartbeat.
///
/// `route` runs on the link task between socket reads and writes, so queued
/// sends wait for it. Implementations should return quickly and hand long
/// work to their own task.
#[async_trait]
pub trait MessageRouter: Send + Sync {
    async fn route(&self, message: InboundMessage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened,
    Closed,
    Error(String),
}

#[derive(Default)]
struct SessionState {
    link: LinkState,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    task: Option<JoinHandle<()>>,
    // Identifies the current link task; callbacks from a replaced task are ignored.
    generation: u64,
}

pub struct ControlSession {
    url: Url,
    router: Arc<dyn MessageRouter>,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl ControlSession {
    pub fn new(
        url: &str,
        router: Arc<dyn MessageRouter>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Arc<Self>, ControlError> {
        let parsed = Url::parse(url).map_err(|err| ControlError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(ControlError::InvalidUrl {
                url: url.to_string(),
                reason: "scheme must be ws or wss".to_string(),
            });
        }

        let (events, _) = broadcast::channel(256);
        Ok(Arc::new(Self {
            url: parsed,
            router,
            notifier,
            inner: Mutex::new(SessionState::default()),
            events,
        }))
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub async fn state(&self) -> LinkState {
        self.inner.lock().await.link
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await.is_connected()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Connects when disconnected, otherwise tears the current link down.
    pub async fn connect_or_toggle(self: &Arc<Self>) {
        match self.state().await {
            LinkState::Disconnected => self.connect().await,
            LinkState::Connecting | LinkState::Connected => self.disconnect().await,
        }
    }

    pub async fn connect(self: &Arc<Self>) {
        let mut guard = self.inner.lock().await;
        if guard.link != LinkState::Disconnected {
            debug!(state = ?guard.link, "control: connect ignored, link already present");
            return;
        }
        guard.generation += 1;
        guard.link = LinkState::Connecting;
        let generation = guard.generation;
        let session = Arc::clone(self);
        guard.task = Some(tokio::spawn(async move {
            session.run_link(generation).await;
        }));
        info!(url = %self.url, generation, "control: connecting");
    }

    /// Drops the current link. The session is `Disconnected` on return and
    /// later writes are refused; the old link task only flushes its close
    /// frame and exits without reporting anything.
    pub async fn disconnect(&self) {
        let mut guard = self.inner.lock().await;
        let link = guard.link;
        if link == LinkState::Disconnected {
            return;
        }
        let task = guard.task.take();
        let outbound = guard.outbound.take();
        guard.generation += 1;
        guard.link = LinkState::Disconnected;
        drop(guard);

        match link {
            LinkState::Connecting => {
                if let Some(task) = task {
                    task.abort();
                }
                info!("control: pending connection abandoned");
            }
            _ => {
                // Dropping the sender ends the link loop right after the close frame.
                if let Some(outbound) = outbound {
                    let _ = outbound.send(Message::Close(None));
                }
                info!(url = %self.url, "control: link closed by request");
            }
        }
        let _ = self.events.send(SessionEvent::Closed);
    }

    /// Queues `message` followed by CRLF. Returns `false`, writing nothing,
    /// unless the link is open.
    pub async fn send(&self, message: &str) -> bool {
        debug!(frame = message, "control: send message");
        let guard = self.inner.lock().await;
        Self::enqueue(&guard, message)
    }

    pub async fn send_frame(&self, frame: &ControlFrame) -> Result<bool, ControlError> {
        let text = serde_json::to_string(frame)?;
        Ok(self.send(&text).await)
    }

    fn enqueue(state: &SessionState, message: &str) -> bool {
        if !state.link.is_connected() {
            return false;
        }
        let Some(outbound) = &state.outbound else {
            return false;
        };
        outbound
            .send(Message::Text(format!("{message}{FRAME_TERMINATOR}")))
            .is_ok()
    }

    async fn run_link(self: Arc<Self>, generation: u64) {
        let ws_stream = match connect_async(self.url.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(err) => {
                self.handle_error(generation, format!("failed to connect websocket: {err}"))
                    .await;
                self.handle_close(generation).await;
                return;
            }
        };
        let (mut ws_writer, mut ws_reader) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        if !self.handle_open(generation, outbound_tx).await {
            let _ = ws_writer.close().await;
            return;
        }

        loop {
            tokio::select! {
                outbound = outbound_rx.recv() => {
                    let Some(message) = outbound else { break };
                    if let Err(err) = ws_writer.send(message).await {
                        self.handle_error(generation, format!("websocket send failed: {err}"))
                            .await;
                        break;
                    }
                }
                inbound = ws_reader.next() => match inbound {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        self.handle_error(generation, format!("websocket receive failed: {err}"))
                            .await;
                        break;
                    }
                },
            }
        }

        self.handle_close(generation).await;
    }

    /// Publishes the open link and queues the handshake as its first write.
    /// Returns `false` when this link was replaced while connecting.
    async fn handle_open(
        &self,
        generation: u64,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            return false;
        }
        guard.link = LinkState::Connected;
        guard.outbound = Some(outbound);
        match serde_json::to_string(&ControlFrame::dashboard_setup()) {
            Ok(handshake) => {
                Self::enqueue(&guard, &handshake);
            }
            Err(err) => error!("control: failed to encode handshake: {err}"),
        }
        drop(guard);

        info!(url = %self.url, "control: link open");
        let _ = self.events.send(SessionEvent::Opened);
        true
    }

    async fn handle_close(&self, generation: u64) {
        {
            let mut guard = self.inner.lock().await;
            if guard.generation != generation {
                return;
            }
            guard.link = LinkState::Disconnected;
            guard.outbound = None;
            guard.task = None;
        }
        info!(url = %self.url, "control: link closed");
        let _ = self.events.send(SessionEvent::Closed);
    }

    async fn handle_error(&self, generation: u64, reason: String) {
        if self.inner.lock().await.generation != generation {
            return;
        }
        debug!(reason, "control: websocket error");
        self.notifier.show_error(CONNECTION_ERROR_TEXT);
        let _ = self.events.send(SessionEvent::Error(reason));
    }

    async fn handle_text(&self, raw: &str) {
        let cleaned = sanitize_frame(raw);
        let value: Value = match serde_json::from_str(&cleaned) {
            Ok(value) => value,
            Err(err) => {
                error!("control: not a valid JSON message: {err}");
                return;
            }
        };
        let Some(message) = InboundMessage::from_value(value) else {
            error!("control: dropping non-object message");
            return;
        };
        if message.is_heartbeat() {
            trace!("control: heartbeat swallowed");
            return;
        }
        if let Some(remote) = message.remote_error() {
            warn!(status = remote.status, "control: {remote}");
        }
        self.router.route(message).await;
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
