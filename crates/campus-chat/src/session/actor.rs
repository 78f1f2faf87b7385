//! Background session task: the single owner of the channel, the reconnect
//! state, and the listener lists.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Sleep;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::message::{ChatMessage, OutboundMessage};
use crate::transport::{
    CloseInfo, Connection, Connector, Frame, FrameSink, FrameStream, TransportError,
};

use super::listeners::Listeners;
use super::types::{ChatTarget, Command, DisconnectReason, GiveUp, SessionConfig, SessionState};

/// Close code sent when the client leaves on purpose.
const NORMAL_CLOSURE: u16 = 1000;

/// Frames buffered for the writer task before sends are dropped.
const OUTBOUND_BUFFER: usize = 64;

type Handshake = BoxFuture<'static, Result<Connection, TransportError>>;

pub(crate) struct SessionActor {
    config: SessionConfig,
    connector: Arc<dyn Connector>,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<SessionState>,
    target: Option<ChatTarget>,
    backoff: Backoff,
    handshake: Option<Handshake>,
    outbound: Option<mpsc::Sender<Frame>>,
    inbound: Option<FrameStream>,
    retry: Option<Pin<Box<Sleep>>>,
    listeners: Listeners,
}

impl SessionActor {
    pub(crate) fn new(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
        commands: mpsc::UnboundedReceiver<Command>,
        state: watch::Sender<SessionState>,
    ) -> Self {
        let backoff = Backoff::new(config.reconnect_base_delay, config.max_reconnect_attempts);
        Self {
            config,
            connector,
            commands,
            state,
            target: None,
            backoff,
            handshake: None,
            outbound: None,
            inbound: None,
            retry: None,
            listeners: Listeners::new(),
        }
    }

    /// Run until the handle is dropped.
    ///
    /// Commands win over transport events that are ready at the same time,
    /// so a registration or `disconnect()` issued before an event arrives
    /// is always applied first.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                result = poll_slot(&mut self.handshake) => {
                    self.handshake = None;
                    self.on_handshake(result);
                }
                frame = next_frame(&mut self.inbound) => self.on_frame(frame),
                () = poll_slot(&mut self.retry) => {
                    self.retry = None;
                    self.on_retry_due();
                }
            }
        }

        debug!("Chat session handle dropped, shutting down");
        self.leave();
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(target) => {
                if self.is_active() {
                    warn!(
                        room_id = target.room_id,
                        "connect() while a session is active; closing the previous channel"
                    );
                    self.close_channel();
                }
                self.handshake = None;
                self.retry = None;
                self.backoff.reset();
                info!(room_id = target.room_id, "Joining chat room");
                self.target = Some(target);
                self.start_handshake();
            }
            Command::Disconnect => {
                debug!(listeners = self.listeners.total(), "Leaving chat room");
                self.leave();
                self.listeners.clear();
            }
            Command::Send(text) => self.send(text),
            Command::Register(id, listener) => self.listeners.register(id, listener),
            Command::Unregister(id) => {
                if !self.listeners.remove(id) {
                    debug!(listener = %id, "Unsubscribe for unknown listener");
                }
            }
        }
    }

    /// Hand a message to the writer task. Never waits on the peer.
    fn send(&mut self, text: String) {
        let open = *self.state.borrow() == SessionState::Open;
        let writer = match self.outbound.as_ref() {
            Some(writer) if open => writer,
            _ => {
                warn!("Chat is not connected; message dropped");
                return;
            }
        };

        let frame = match OutboundMessage::new(&text).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to encode chat message");
                return;
            }
        };

        match writer.try_send(Frame::Text(frame)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    buffered = OUTBOUND_BUFFER,
                    "Chat peer is not reading; message dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Chat writer has stopped; message dropped");
            }
        }
    }

    /// Tear down everything tied to the current room without notifying
    /// disconnect listeners.
    fn leave(&mut self) {
        self.close_channel();
        self.handshake = None;
        self.retry = None;
        self.target = None;
        self.backoff.reset();
        self.set_state(SessionState::Idle);
    }

    // -----------------------------------------------------------------------
    // Transport events
    // -----------------------------------------------------------------------

    fn on_handshake(&mut self, result: Result<Connection, TransportError>) {
        match result {
            Ok(connection) => {
                self.outbound = Some(spawn_writer(connection.outbound));
                self.inbound = Some(connection.inbound);
                self.backoff.reset();
                self.set_state(SessionState::Open);
                info!(room_id = self.room_id(), "Chat connected");
                self.listeners.emit_connect();
            }
            Err(e) => {
                warn!(room_id = self.room_id(), error = %e, "Chat handshake failed");
                self.on_closed(DisconnectReason::from_error(&e));
            }
        }
    }

    fn on_frame(&mut self, frame: Option<Result<Frame, TransportError>>) {
        match frame {
            Some(Ok(Frame::Text(text))) => match ChatMessage::from_frame(&text) {
                Ok(msg) => self.listeners.emit_message(&msg),
                Err(e) => {
                    warn!(error = %e, len = text.len(), "Dropping malformed chat frame");
                }
            },
            Some(Ok(Frame::Binary(bytes))) => {
                debug!(len = bytes.len(), "Ignoring binary chat frame");
            }
            Some(Ok(Frame::Close(info))) => {
                info!(room_id = self.room_id(), close = ?info, "Chat server closed the channel");
                self.on_closed(DisconnectReason::from_close(info));
            }
            Some(Err(e)) => {
                warn!(room_id = self.room_id(), error = %e, "Chat channel error");
                self.on_closed(DisconnectReason::from_error(&e));
            }
            None => {
                info!(room_id = self.room_id(), "Chat channel ended");
                self.on_closed(DisconnectReason::abnormal("connection lost"));
            }
        }
    }

    /// A closure we did not ask for: notify, then decide whether to retry.
    fn on_closed(&mut self, reason: DisconnectReason) {
        self.outbound = None;
        self.inbound = None;
        self.set_state(SessionState::Closed);
        self.listeners.emit_disconnect(&reason);

        let Some(room_id) = self.target.as_ref().map(|t| t.room_id) else {
            return;
        };

        match self.backoff.next_delay() {
            Some(delay) => {
                info!(
                    room_id,
                    attempt = self.backoff.attempts(),
                    max_attempts = self.backoff.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "Reconnecting to chat"
                );
                self.retry = Some(Box::pin(tokio::time::sleep(delay)));
            }
            None => {
                let event = GiveUp {
                    room_id,
                    attempts: self.backoff.attempts(),
                };
                warn!(room_id, attempts = event.attempts, "Giving up on chat reconnect");
                self.listeners.emit_give_up(&event);
            }
        }
    }

    fn on_retry_due(&mut self) {
        if self.target.is_some() {
            self.start_handshake();
        } else {
            debug!("Reconnect timer fired after leaving; ignoring");
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn start_handshake(&mut self) {
        let Some(target) = &self.target else {
            return;
        };
        let url = self.config.endpoint(target.room_id, &target.token);
        let connector = Arc::clone(&self.connector);
        self.handshake = Some(Box::pin(async move { connector.connect(&url).await }));
        self.set_state(SessionState::Connecting);
    }

    /// Close the live channel, if any. The close frame is queued behind any
    /// pending sends; the writer task closes the sink once it drains.
    fn close_channel(&mut self) {
        self.inbound = None;
        if let Some(writer) = self.outbound.take() {
            let bye = Frame::Close(Some(CloseInfo::new(NORMAL_CLOSURE, "client disconnect")));
            if writer.try_send(bye).is_err() {
                debug!("Chat writer busy or gone; closing without a close frame");
            }
        }
    }

    fn is_active(&self) -> bool {
        self.handshake.is_some() || self.outbound.is_some() || self.retry.is_some()
    }

    fn room_id(&self) -> Option<i64> {
        self.target.as_ref().map(|t| t.room_id)
    }

    fn set_state(&self, next: SessionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(from = %prev, to = %next, "Chat session state");
        }
    }
}

impl Drop for SessionActor {
    /// Handles still watching never see a stale `Open` once the task is gone,
    /// including when it unwinds.
    fn drop(&mut self) {
        self.state.send_replace(SessionState::Idle);
    }
}

/// Own the sink on its own task so a peer that stops reading stalls only
/// the writer. Ends, closing the sink, when the sender side is dropped or a
/// write fails.
fn spawn_writer(mut sink: FrameSink) -> mpsc::Sender<Frame> {
    let (tx, mut rx) = mpsc::channel::<Frame>(OUTBOUND_BUFFER);
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sink.send(frame).await {
                warn!(error = %e, "Failed to write chat frame");
                return;
            }
        }
        let _ = sink.close().await;
    });
    tx
}

/// Await the future in `slot`, or never resolve if the slot is empty.
async fn poll_slot<F>(slot: &mut Option<F>) -> F::Output
where
    F: Future + Unpin,
{
    match slot {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

async fn next_frame(stream: &mut Option<FrameStream>) -> Option<Result<Frame, TransportError>> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
