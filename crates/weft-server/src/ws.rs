//! WebSocket transport between editor clients and the authority.
//!
//! Frames are JSON text in the `{"event": ..., "payload": ...}` envelope.
//! Each socket gets a reader task that forwards `text_operation` frames into
//! the mutation queue and a writer task that drains the connection's update
//! stream.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};
use weft_core::{ClientEvent, EditOperation, ServerEvent};

use crate::authority::{AuthorityHandle, ConnectionId};

#[derive(Clone)]
pub struct AppState {
    pub authority: AuthorityHandle,
}

pub fn router(state: AppState, socket_path: &str) -> Router {
    Router::new()
        .route(socket_path, get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection = match state.authority.connect().await {
        Ok(connection) => connection,
        Err(e) => {
            warn!(error = %e, "rejecting socket");
            return;
        }
    };
    let id = connection.id;
    let mut updates = connection.updates;
    let (mut write, mut read) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            let frame = match ServerEvent::DocUpdate(update).to_json() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(id, error = %e, "failed to encode doc_update");
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(frame.into())).await {
                debug!(id, error = %e, "socket write failed");
                break;
            }
        }
    });

    let authority = state.authority.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let Some(op) = parse_frame(id, text.as_str()) else {
                        continue;
                    };
                    if let Err(e) = authority.apply(id, op).await {
                        warn!(id, error = %e, "dropping connection");
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                // Ping/pong are answered by axum.
                Ok(_) => {}
                Err(e) => {
                    debug!(id, error = %e, "socket read failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    if let Err(e) = state.authority.disconnect(id).await {
        debug!(id, error = %e, "authority gone before disconnect");
    }
}

/// Decode one inbound text frame. Malformed frames are logged and skipped.
pub fn parse_frame(id: ConnectionId, text: &str) -> Option<EditOperation> {
    match ClientEvent::from_json(text) {
        Ok(ClientEvent::TextOperation(op)) => Some(op),
        Err(e) => {
            warn!(id, error = %e, "ignoring malformed frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::tungstenite::Message as WsMessage;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
    use weft_core::CanonicalUpdate;

    use super::*;
    use crate::authority::Authority;

    type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn next_update(socket: &mut ClientSocket) -> CanonicalUpdate {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
                .await
                .expect("timed out waiting for doc_update")
                .unwrap()
                .unwrap();
            if let WsMessage::Text(text) = msg {
                let ServerEvent::DocUpdate(update) = ServerEvent::from_json(text.as_str()).unwrap();
                return update;
            }
        }
    }

    #[test]
    fn test_parse_text_operation_frames() {
        assert_eq!(
            parse_frame(
                1,
                r#"{"event":"text_operation","payload":{"type":"insert","at":3,"char":"l"}}"#
            ),
            Some(EditOperation::Insert { at: 3, ch: 'l' })
        );
        assert_eq!(
            parse_frame(
                1,
                r#"{"event":"text_operation","payload":{"type":"delete","at":4}}"#
            ),
            Some(EditOperation::Delete { at: 4 })
        );
    }

    #[test]
    fn test_malformed_frames_are_skipped() {
        assert_eq!(parse_frame(1, "not json"), None);
        assert_eq!(parse_frame(1, r#"{"event":"doc_update","payload":{}}"#), None);
        assert_eq!(
            parse_frame(
                1,
                r#"{"event":"text_operation","payload":{"type":"insert","at":3}}"#
            ),
            None
        );
    }

    #[test]
    fn test_doc_update_frame() {
        let frame = ServerEvent::DocUpdate(weft_core::CanonicalUpdate::new("hi", None).with_revision(2))
            .to_json()
            .unwrap();
        insta::assert_snapshot!(frame, @r#"{"event":"doc_update","payload":{"document":"hi","cursor_pos":null,"revision":2}}"#);
    }

    #[tokio::test]
    async fn test_socket_round_trip() {
        let (authority, _task) = Authority::new("helo").spawn(16);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(
            AppState {
                authority: authority.clone(),
            },
            "/socket",
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let url = format!("ws://{addr}/socket");
        let (mut a, _) = connect_async(url.as_str()).await.unwrap();
        let (mut b, _) = connect_async(url.as_str()).await.unwrap();
        assert_eq!(next_update(&mut a).await.document, "helo");
        assert_eq!(next_update(&mut b).await.document, "helo");

        // A malformed frame is skipped and the socket stays open.
        a.send(WsMessage::Text("not json".into())).await.unwrap();
        a.send(WsMessage::Text(
            r#"{"event":"text_operation","payload":{"type":"insert","at":4,"char":"l"}}"#.into(),
        ))
        .await
        .unwrap();

        let to_a = next_update(&mut a).await;
        let to_b = next_update(&mut b).await;
        assert_eq!(to_a.document, "hello");
        assert_eq!(to_a.cursor_pos, Some(4));
        assert_eq!(to_a.revision, Some(1));
        assert_eq!(to_b.document, "hello");
        assert_eq!(to_b.cursor_pos, None);
        assert_eq!(to_b.revision, Some(1));

        b.close(None).await.unwrap();
        let mut remaining = authority.connection_count().await.unwrap();
        for _ in 0..100 {
            if remaining == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            remaining = authority.connection_count().await.unwrap();
        }
        assert_eq!(remaining, 1);
    }
}
