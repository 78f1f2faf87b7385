//! In-memory transport for driving `ChatSession` in tests.
//!
//! Every `connect()` call surfaces as a [`Handshake`] on the test side,
//! which decides when and whether it succeeds.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use campus_chat::{
    ChatMessage, ChatSession, CloseInfo, Connection, Connector, DisconnectReason, Frame,
    FrameSink, FrameStream, GiveUp, SessionConfig, TransportError,
};
use futures_util::{sink, stream};
use tokio::sync::{mpsc, oneshot};

pub const SAMPLE_FRAME: &str = r#"{"id":"1","batch_id":42,"user_id":7,"user_name":"Ann","user_role":"mentor","message":"hi","timestamp":"2024-01-01T00:00:00Z"}"#;

pub fn sample_message() -> ChatMessage {
    ChatMessage::from_frame(SAMPLE_FRAME).unwrap()
}

pub fn message(id: &str, text: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        batch_id: 42,
        user_id: 7,
        user_name: "Ann".into(),
        user_role: "mentor".into(),
        message: text.to_string(),
        timestamp: "2024-01-01T00:00:00Z".into(),
    }
}

pub fn test_config() -> SessionConfig {
    SessionConfig {
        base_url: "ws://chat.test".into(),
        ..SessionConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

pub struct MockConnector {
    handshakes: mpsc::UnboundedSender<Handshake>,
}

impl MockConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Handshake>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { handshakes: tx }, rx)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        let (reply, outcome) = oneshot::channel();
        let _ = self.handshakes.send(Handshake {
            url: url.to_string(),
            reply,
        });
        outcome
            .await
            .unwrap_or_else(|_| Err(TransportError::Connect("handshake abandoned".into())))
    }
}

/// A pending handshake, resolved by the test.
pub struct Handshake {
    pub url: String,
    reply: oneshot::Sender<Result<Connection, TransportError>>,
}

impl Handshake {
    /// Complete the handshake and hand back the server side of the channel.
    pub fn accept(self) -> ServerEnd {
        let (to_client, client_rx) = mpsc::unbounded_channel::<Result<Frame, TransportError>>();
        let (client_tx, from_client) = mpsc::unbounded_channel::<Frame>();

        let outbound: FrameSink = Box::pin(sink::unfold(client_tx, |tx, frame: Frame| async move {
            tx.send(frame).map_err(|_| TransportError::Closed)?;
            Ok::<_, TransportError>(tx)
        }));
        let inbound: FrameStream = Box::pin(stream::unfold(client_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }));

        let _ = self.reply.send(Ok(Connection::new(outbound, inbound)));
        ServerEnd {
            to_client: Some(to_client),
            from_client,
        }
    }

    /// Complete the handshake with a peer that never reads: every write
    /// from the client stays pending.
    pub fn accept_unread(self) -> ServerEnd {
        let (to_client, client_rx) = mpsc::unbounded_channel::<Result<Frame, TransportError>>();
        let (_client_tx, from_client) = mpsc::unbounded_channel::<Frame>();

        let outbound: FrameSink = Box::pin(sink::unfold((), |(), _frame: Frame| {
            std::future::pending::<Result<(), TransportError>>()
        }));
        let inbound: FrameStream = Box::pin(stream::unfold(client_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }));

        let _ = self.reply.send(Ok(Connection::new(outbound, inbound)));
        ServerEnd {
            to_client: Some(to_client),
            from_client,
        }
    }

    pub fn reject(self, reason: &str) {
        let _ = self
            .reply
            .send(Err(TransportError::Connect(reason.to_string())));
    }
}

/// The server side of an accepted channel.
pub struct ServerEnd {
    to_client: Option<mpsc::UnboundedSender<Result<Frame, TransportError>>>,
    from_client: mpsc::UnboundedReceiver<Frame>,
}

impl ServerEnd {
    pub fn push_text(&self, text: &str) {
        self.push(Ok(Frame::Text(text.to_string())));
    }

    pub fn push_message(&self, msg: &ChatMessage) {
        self.push_text(&serde_json::to_string(msg).unwrap());
    }

    pub fn push(&self, item: Result<Frame, TransportError>) {
        if let Some(tx) = &self.to_client {
            // The client may already have dropped its side.
            let _ = tx.send(item);
        }
    }

    /// Close with a close frame.
    pub fn close_with(&mut self, code: u16, reason: &str) {
        self.push(Ok(Frame::Close(Some(CloseInfo::new(code, reason)))));
        self.to_client = None;
    }

    /// Drop the channel without a close frame.
    pub fn drop_connection(&mut self) {
        self.to_client = None;
    }

    /// Next frame written by the client, or `None` once it dropped its sink.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        self.from_client.recv().await
    }
}

// ---------------------------------------------------------------------------
// Listener recorder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connected,
    Message(ChatMessage),
    Disconnected(DisconnectReason),
    GaveUp(GiveUp),
}

/// Registers one listener of each kind and records what they observe.
pub struct Recorder {
    pub events: mpsc::UnboundedReceiver<Event>,
    pub log: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn attach(session: &ChatSession) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let log = Arc::new(Mutex::new(Vec::new()));

        let emit = {
            let log = Arc::clone(&log);
            move |event: Event| {
                log.lock().unwrap().push(event.clone());
                let _ = tx.send(event);
            }
        };

        let e = emit.clone();
        session.on_connect(move || e(Event::Connected));
        let e = emit.clone();
        session.on_message(move |msg| e(Event::Message(msg.clone())));
        let e = emit.clone();
        session.on_disconnect(move |reason| e(Event::Disconnected(reason.clone())));
        let e = emit;
        session.on_give_up(move |event| e(Event::GaveUp(*event)));

        Self { events, log }
    }

    pub async fn next(&mut self) -> Event {
        tokio::time::timeout(Duration::from_secs(3600), self.events.recv())
            .await
            .expect("timed out waiting for a listener event")
            .expect("listener channel closed")
    }

    /// Assert that nothing is observed for a long (virtual) while. A closed
    /// channel means every listener was cleared, which is quiet too.
    pub async fn assert_quiet(&mut self) {
        match tokio::time::timeout(Duration::from_secs(3600), self.events.recv()).await {
            Err(_) | Ok(None) => {}
            Ok(Some(event)) => panic!("unexpected listener event: {event:?}"),
        }
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

pub async fn next_handshake(rx: &mut mpsc::UnboundedReceiver<Handshake>) -> Handshake {
    tokio::time::timeout(Duration::from_secs(3600), rx.recv())
        .await
        .expect("timed out waiting for a handshake")
        .expect("connector dropped")
}

pub async fn assert_no_handshake(rx: &mut mpsc::UnboundedReceiver<Handshake>) {
    let outcome = tokio::time::timeout(Duration::from_secs(3600), rx.recv()).await;
    assert!(
        outcome.is_err(),
        "unexpected handshake: {:?}",
        outcome.ok().flatten().map(|h| h.url)
    );
}
