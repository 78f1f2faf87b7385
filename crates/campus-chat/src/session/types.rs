//! Configuration, state, and event types for the session manager.

use std::fmt;
use std::time::Duration;

use crate::transport::{CloseInfo, TransportError};

use super::listeners::{Listener, ListenerId};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Endpoint and reconnect settings for a chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base WebSocket URL, e.g. `ws://localhost:8000`.
    pub base_url: String,
    /// Delay before the first reconnect attempt; doubles on each attempt.
    pub reconnect_base_delay: Duration,
    /// Reconnect attempts after a closure before giving up.
    pub max_reconnect_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "ws://localhost:8000".to_string(),
            reconnect_base_delay: Duration::from_secs(1),
            max_reconnect_attempts: 5,
        }
    }
}

impl SessionConfig {
    /// Build the room endpoint: `{base_url}/ws/chat/{room_id}?token={token}`.
    pub fn endpoint(&self, room_id: i64, token: &str) -> String {
        format!(
            "{}/ws/chat/{}?token={}",
            self.base_url.trim_end_matches('/'),
            room_id,
            urlencoding::encode(token)
        )
    }
}

/// The room a session is joined to, with the caller's credential.
#[derive(Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub room_id: i64,
    pub token: String,
}

impl ChatTarget {
    pub fn new(room_id: i64, token: impl Into<String>) -> Self {
        Self {
            room_id,
            token: token.into(),
        }
    }
}

impl fmt::Debug for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTarget")
            .field("room_id", &self.room_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle of the session's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No room joined.
    #[default]
    Idle,
    /// Handshake in flight.
    Connecting,
    /// Channel acknowledged open; sends are transmitted.
    Open,
    /// Channel lost; a reconnect may be pending, or the budget is spent.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Why the channel closed, passed to disconnect listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectReason {
    /// WebSocket close code, if the peer sent one (1006 when the channel
    /// dropped without a close handshake).
    pub code: Option<u16>,
    pub reason: String,
}

/// Close code used when the channel ends without a close frame.
pub(crate) const ABNORMAL_CLOSURE: u16 = 1006;

impl DisconnectReason {
    pub fn new(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_close(info: Option<CloseInfo>) -> Self {
        match info {
            Some(info) => Self::new(Some(info.code), info.reason),
            None => Self::new(None, "closed by server"),
        }
    }

    pub(crate) fn abnormal(reason: impl Into<String>) -> Self {
        Self::new(Some(ABNORMAL_CLOSURE), reason)
    }

    pub(crate) fn from_error(err: &TransportError) -> Self {
        Self::abnormal(err.to_string())
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code: {})", self.reason, code),
            None => write!(f, "{}", self.reason),
        }
    }
}

/// Emitted once when the reconnect budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiveUp {
    pub room_id: i64,
    pub attempts: u32,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands sent from the handle to the session task.
pub(crate) enum Command {
    Connect(ChatTarget),
    Disconnect,
    Send(String),
    Register(ListenerId, Listener),
    Unregister(ListenerId),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Connect(target) => f.debug_tuple("Connect").field(target).finish(),
            Command::Disconnect => f.write_str("Disconnect"),
            Command::Send(text) => f.debug_tuple("Send").field(&text.len()).finish(),
            Command::Register(id, _) => f.debug_tuple("Register").field(id).finish(),
            Command::Unregister(id) => f.debug_tuple("Unregister").field(id).finish(),
        }
    }
}
