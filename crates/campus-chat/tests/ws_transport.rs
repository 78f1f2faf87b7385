//! `WsConnector` against a real loopback WebSocket server.

use std::time::Duration;

use campus_chat::{ChatSession, Connector, SessionConfig, TransportError, WsConnector};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

const SAMPLE_FRAME: &str = r#"{"id":"9","batch_id":42,"user_id":3,"user_name":"Raj","user_role":"student","message":"hello mentor","timestamp":"2024-03-01T10:15:00Z"}"#;

/// Accept one client, push `SAMPLE_FRAME`, and forward every text frame the
/// client writes. Returns the server address, the requested URI, and the
/// forwarded frames.
async fn spawn_chat_server() -> (
    std::net::SocketAddr,
    oneshot::Receiver<String>,
    mpsc::UnboundedReceiver<String>,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (uri_tx, uri_rx) = oneshot::channel();
    let (frame_tx, frame_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| {
            let _ = uri_tx.send(req.uri().to_string());
            Ok::<_, ErrorResponse>(resp)
        })
        .await
        .unwrap();

        let (mut write, mut read) = ws.split();
        write.send(Message::Text(SAMPLE_FRAME.into())).await.unwrap();

        while let Some(Ok(msg)) = read.next().await {
            if let Message::Text(text) = msg {
                let _ = frame_tx.send(text.as_str().to_owned());
            }
        }
    });

    (addr, uri_rx, frame_rx)
}

#[tokio::test]
async fn session_round_trip_over_websocket() {
    let (addr, uri_rx, mut frames) = spawn_chat_server().await;

    let config = SessionConfig {
        base_url: format!("ws://{addr}"),
        ..SessionConfig::default()
    };
    let connector = WsConnector::new().with_handshake_timeout(Some(Duration::from_secs(5)));
    let session = ChatSession::new(config, connector);

    let (msg_tx, mut messages) = mpsc::unbounded_channel();
    session.on_message(move |msg| {
        let _ = msg_tx.send(msg.clone());
    });
    let (open_tx, mut opened) = mpsc::unbounded_channel();
    session.on_connect(move || {
        let _ = open_tx.send(());
    });

    session.connect(42, "secret token");

    let uri = timeout(Duration::from_secs(5), uri_rx).await.unwrap().unwrap();
    assert_eq!(uri, "/ws/chat/42?token=secret%20token");

    timeout(Duration::from_secs(5), opened.recv()).await.unwrap().unwrap();
    let msg = timeout(Duration::from_secs(5), messages.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.id, "9");
    assert_eq!(msg.user_name, "Raj");
    assert_eq!(msg.message, "hello mentor");

    session.send_message("thanks!");
    let frame = timeout(Duration::from_secs(5), frames.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frame, r#"{"message":"thanks!"}"#);

    session.disconnect();
}

#[tokio::test]
async fn refused_connection_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = WsConnector::new()
        .connect(&format!("ws://{addr}/ws/chat/1?token=t"))
        .await;
    assert!(matches!(result, Err(TransportError::Connect(_))));
}

#[tokio::test]
async fn silent_server_hits_the_handshake_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept the TCP connection and never answer the upgrade.
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let limit = Duration::from_millis(200);
    let result = WsConnector::new()
        .with_handshake_timeout(Some(limit))
        .connect(&format!("ws://{addr}/ws/chat/1?token=t"))
        .await;
    assert!(matches!(result, Err(TransportError::Timeout(d)) if d == limit));
}
