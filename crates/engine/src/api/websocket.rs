//! WebSocket handlers for drawing surfaces and editor UIs.
//!
//! `/ws/surface` carries the surface vocabulary in both directions.
//! `/ws/editor` is outbound only: editor events such as selection changes.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use questforge_shared::SurfaceMessage;

use super::connections::{ClientKind, Outbound};
use crate::app::App;

/// Frames queued per client before new ones are dropped.
const CLIENT_BUFFER: usize = 256;

/// WebSocket upgrade handler for drawing surfaces.
pub async fn surface_ws_handler(
    ws: WebSocketUpgrade,
    State(app): State<Arc<App>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_surface_socket(socket, app))
}

/// WebSocket upgrade handler for editor UIs.
pub async fn editor_ws_handler(
    ws: WebSocketUpgrade,
    State(app): State<Arc<App>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_editor_socket(socket, app))
}

/// Forward queued frames to the socket until either side closes.
fn spawn_sender(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match serde_json::to_string(&frame) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to serialize outbound frame"),
            }
        }
    })
}

async fn handle_surface_socket(socket: WebSocket, app: Arc<App>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let connection_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(CLIENT_BUFFER);

    app.connections
        .register(connection_id, ClientKind::Surface, tx)
        .await;
    tracing::info!(connection_id = %connection_id, "Surface connected");

    let send_task = spawn_sender(ws_sender, rx);

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let message = match SurfaceMessage::from_json(text.as_str()) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!(connection_id = %connection_id, error = %e, "Unreadable surface message");
                        continue;
                    }
                };
                if let Err(e) = app.bridge.handle(message).await {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Surface message rejected");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "Surface socket error");
                break;
            }
        }
    }

    app.connections.unregister(connection_id).await;
    send_task.abort();
    tracing::info!(connection_id = %connection_id, "Surface disconnected");
}

async fn handle_editor_socket(socket: WebSocket, app: Arc<App>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let connection_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(CLIENT_BUFFER);

    app.connections
        .register(connection_id, ClientKind::Editor, tx)
        .await;
    tracing::info!(connection_id = %connection_id, "Editor connected");

    let send_task = spawn_sender(ws_sender, rx);

    // Inbound frames carry nothing; wait for the close.
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    app.connections.unregister(connection_id).await;
    send_task.abort();
    tracing::info!(connection_id = %connection_id, "Editor disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    use questforge_domain::ViewId;

    use crate::infrastructure::ports::MockGameStore;

    async fn serve() -> (std::net::SocketAddr, Arc<App>) {
        let app = Arc::new(App::new(Arc::new(MockGameStore::new())));
        let router = Router::new()
            .route("/ws/surface", get(surface_ws_handler))
            .route("/ws/editor", get(editor_ws_handler))
            .with_state(app.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (addr, app)
    }

    async fn next_text<S>(stream: &mut S) -> serde_json::Value
    where
        S: StreamExt<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            match stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(_)) => continue,
                other => panic!("socket ended: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn when_the_surface_is_ready_then_it_receives_the_current_document() {
        let (addr, app) = serve().await;
        {
            let mut views = app.views.write().await;
            views.ensure_world();
            views.set_current_view(ViewId::world()).unwrap();
        }

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/surface"))
            .await
            .unwrap();
        socket
            .send(WsMessage::Text(r#"{"type":"c2v:canvasReady"}"#.into()))
            .await
            .unwrap();

        let frame = next_text(&mut socket).await;
        assert_eq!(frame["type"], "v2c:setDocument");
        assert_eq!(frame["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn when_a_shape_is_selected_then_editors_are_notified() {
        let (addr, app) = serve().await;

        let (mut editor, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/editor"))
            .await
            .unwrap();
        let (mut surface, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/surface"))
            .await
            .unwrap();
        while app.connections.count(ClientKind::Editor).await == 0
            || app.connections.count(ClientKind::Surface).await == 0
        {
            tokio::task::yield_now().await;
        }

        surface
            .send(WsMessage::Text(r#"{"type":"c2v:unselect"}"#.into()))
            .await
            .unwrap();

        let frame = next_text(&mut editor).await;
        assert_eq!(frame["type"], "unselected");
    }
}
