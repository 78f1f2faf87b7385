//! WebSocket connector backed by `tokio-tungstenite`.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{future, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info};

use super::{CloseInfo, Connection, Connector, Frame, FrameSink, FrameStream, TransportError};

/// Production connector over `tokio_tungstenite::connect_async`.
#[derive(Debug, Clone, Default)]
pub struct WsConnector {
    handshake_timeout: Option<Duration>,
}

impl WsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort handshakes that take longer than `timeout`.
    pub fn with_handshake_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        info!(url = %redact_query(url), "Connecting to chat endpoint");

        let handshake = tokio_tungstenite::connect_async(url);
        let result = match self.handshake_timeout {
            Some(limit) => tokio::time::timeout(limit, handshake)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => handshake.await,
        };
        let (ws_stream, _response) = result.map_err(|e| TransportError::Connect(e.to_string()))?;

        let (ws_write, ws_read) = ws_stream.split();

        let outbound: FrameSink = Box::pin(
            ws_write
                .sink_map_err(|e| TransportError::Send(e.to_string()))
                .with(|frame: Frame| future::ready(Ok::<_, TransportError>(to_ws(frame)))),
        );

        let inbound: FrameStream = Box::pin(ws_read.filter_map(|item| {
            future::ready(match item {
                Ok(msg) => from_ws(msg).map(Ok),
                Err(e) => Some(Err(TransportError::Receive(e.to_string()))),
            })
        }));

        Ok(Connection::new(outbound, inbound))
    }
}

fn to_ws(frame: Frame) -> WsMessage {
    match frame {
        Frame::Text(text) => WsMessage::Text(text.into()),
        Frame::Binary(bytes) => WsMessage::Binary(bytes.into()),
        Frame::Close(info) => WsMessage::Close(info.map(|info| CloseFrame {
            code: CloseCode::from(info.code),
            reason: info.reason.into(),
        })),
    }
}

/// Control frames are answered by tungstenite itself and not surfaced.
fn from_ws(msg: WsMessage) -> Option<Frame> {
    match msg {
        WsMessage::Text(text) => Some(Frame::Text(text.as_str().to_owned())),
        WsMessage::Binary(bytes) => Some(Frame::Binary(bytes.to_vec())),
        WsMessage::Close(frame) => Some(Frame::Close(frame.map(|f| CloseInfo {
            code: u16::from(f.code),
            reason: f.reason.as_str().to_owned(),
        }))),
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {
            debug!("Ignoring control frame");
            None
        }
    }
}

/// Strip the query string so credentials never reach the logs.
pub(crate) fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or("")
}
