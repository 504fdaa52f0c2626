use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use marketdesk_core::LiveUpdate;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

pub async fn live_updates(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let updates = state.live.subscribe();
    ws.on_upgrade(move |socket| stream_updates(socket, updates))
}

/// Forwards every published update as a JSON text frame until either side closes.
async fn stream_updates(socket: WebSocket, mut updates: broadcast::Receiver<LiveUpdate>) {
    let client_id = Uuid::new_v4();
    info!(%client_id, "live client connected");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            let update = match updates.recv().await {
                Ok(update) => update,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%client_id, skipped, "live client lagging, updates dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let payload = match serde_json::to_string(&update) {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(%client_id, %error, "failed to encode live update");
                    continue;
                }
            };
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Close(_) => break,
                Message::Text(text) => debug!(%client_id, %text, "ignoring client message"),
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!(%client_id, "live client disconnected");
}
