//! Public handle for a chat session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::message::ChatMessage;
use crate::transport::Connector;

use super::actor::SessionActor;
use super::listeners::{Listener, ListenerId};
use super::types::{ChatTarget, Command, DisconnectReason, GiveUp, SessionConfig, SessionState};

// ---------------------------------------------------------------------------
// Session handle
// ---------------------------------------------------------------------------

/// Handle to one chat session: at most one live channel to one room.
///
/// All methods are non-blocking and only enqueue commands for the
/// background session task, which processes them in call order. Dropping
/// the handle shuts the task down and closes the channel.
///
/// Must be created inside a Tokio runtime.
pub struct ChatSession {
    command_tx: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SessionState>,
    next_listener: AtomicU64,
}

impl ChatSession {
    /// Create an idle session that will open channels through `connector`.
    pub fn new<C: Connector>(config: SessionConfig, connector: C) -> Self {
        Self::with_connector(config, Arc::new(connector))
    }

    /// Like [`ChatSession::new`] with a shared connector.
    pub fn with_connector(config: SessionConfig, connector: Arc<dyn Connector>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        tokio::spawn(SessionActor::new(config, connector, command_rx, state_tx).run());

        Self {
            command_tx,
            state: state_rx,
            next_listener: AtomicU64::new(1),
        }
    }

    /// Join `room_id` with `token`. Returns immediately; the outcome is
    /// reported to connect or disconnect listeners.
    ///
    /// An already active channel is closed first without notifying
    /// disconnect listeners.
    pub fn connect(&self, room_id: i64, token: impl Into<String>) {
        self.send_command(Command::Connect(ChatTarget::new(room_id, token)));
    }

    /// Leave the room: close the channel, cancel any pending reconnect and
    /// clear every listener. Safe to call at any time, any number of times.
    pub fn disconnect(&self) {
        self.send_command(Command::Disconnect);
    }

    /// Send `{"message": text}` if the channel is open at the time the
    /// session task handles the request. Otherwise the text is dropped and
    /// logged; it is never queued for a later connection.
    pub fn send_message(&self, text: impl Into<String>) {
        self.send_command(Command::Send(text.into()));
    }

    /// `true` iff the channel is acknowledged open.
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Open
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Called with each well-formed inbound message, in arrival order.
    pub fn on_message<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        self.register(Listener::Message(Box::new(listener)))
    }

    /// Called each time a handshake completes.
    pub fn on_connect<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(Listener::Connect(Box::new(listener)))
    }

    /// Called on every closure not caused by [`ChatSession::disconnect`],
    /// including failed handshakes, before any reconnect is scheduled.
    pub fn on_disconnect<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DisconnectReason) + Send + Sync + 'static,
    {
        self.register(Listener::Disconnect(Box::new(listener)))
    }

    /// Called once when the reconnect budget is spent. The session stays
    /// closed until [`ChatSession::connect`] is called again.
    pub fn on_give_up<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&GiveUp) + Send + Sync + 'static,
    {
        self.register(Listener::GiveUp(Box::new(listener)))
    }

    fn register(&self, listener: Listener) -> Subscription {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.send_command(Command::Register(id, listener));
        Subscription {
            id,
            command_tx: self.command_tx.downgrade(),
        }
    }

    fn send_command(&self, command: Command) {
        if let Err(e) = self.command_tx.send(command) {
            warn!(command = ?e.0, "Chat session task is gone; command dropped");
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Registration handle returned by the `on_*` methods.
///
/// Dropping it leaves the listener registered; call
/// [`Subscription::unsubscribe`] to detach it.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    command_tx: mpsc::WeakUnboundedSender<Command>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Detach this listener. A no-op if the session is gone or the
    /// listener was already cleared by `disconnect()`.
    pub fn unsubscribe(self) {
        if let Some(tx) = self.command_tx.upgrade() {
            let _ = tx.send(Command::Unregister(self.id));
        }
    }
}
