//! Transport seam between the session manager and the network.
//!
//! The session manager only sees [`Frame`]s flowing through a boxed
//! sink/stream pair produced by a [`Connector`]. [`WsConnector`] is the
//! production implementation over `tokio-tungstenite`.

mod ws;

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, Stream};

pub use ws::WsConnector;

/// Close code and reason reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// A single transport frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Close(Option<CloseInfo>),
}

/// Errors raised by a transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),

    #[error("send failed: {0}")]
    Send(String),

    #[error("receive failed: {0}")]
    Receive(String),

    #[error("channel closed")]
    Closed,
}

pub type FrameSink = Pin<Box<dyn Sink<Frame, Error = TransportError> + Send>>;
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, TransportError>> + Send>>;

/// An open channel: outbound frames go into `outbound`, inbound frames come
/// out of `inbound`. The stream ending means the channel closed.
pub struct Connection {
    pub outbound: FrameSink,
    pub inbound: FrameStream,
}

impl Connection {
    pub fn new(outbound: FrameSink, inbound: FrameStream) -> Self {
        Self { outbound, inbound }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens channels to a chat endpoint.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Perform the handshake. Resolves once the peer acknowledged the open.
    async fn connect(&self, url: &str) -> Result<Connection, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        assert_eq!(
            TransportError::Connect("refused".into()).to_string(),
            "connect failed: refused"
        );
        assert_eq!(
            TransportError::Timeout(Duration::from_secs(15)).to_string(),
            "handshake timed out after 15s"
        );
        assert_eq!(TransportError::Closed.to_string(), "channel closed");
    }

    #[test]
    fn close_info_new() {
        let info = CloseInfo::new(4001, "token expired");
        assert_eq!(info.code, 4001);
        assert_eq!(info.reason, "token expired");
    }
}
