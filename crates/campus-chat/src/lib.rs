//! Real-time batch chat client.
//!
//! A [`ChatSession`] owns one WebSocket channel to a batch chat room,
//! reconnects with exponential backoff after unexpected closures, and fans
//! inbound messages and connectivity changes out to registered listeners.

pub mod backoff;
pub mod history;
pub mod message;
pub mod session;
pub mod transport;

pub use backoff::Backoff;
pub use history::{ChatHistory, ChatHistoryConfig};
pub use message::{ChatMessage, OutboundMessage};
pub use session::{
    ChatSession, ChatTarget, DisconnectReason, GiveUp, ListenerId, SessionConfig, SessionState,
    Subscription,
};
pub use transport::{
    CloseInfo, Connection, Connector, Frame, FrameSink, FrameStream, TransportError, WsConnector,
};
