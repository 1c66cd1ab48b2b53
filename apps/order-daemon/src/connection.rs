//! One task per WebSocket connection.
//!
//! Frames on a connection are handled strictly in order, one response per
//! utterance. A frame that fails to decode closes that connection only.

use crate::metrics::MetricsHub;
use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use dialog_engine::{decode_event, DialogEngine, ProtocolError};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

pub struct AppState {
    pub engine: DialogEngine,
    pub metrics: MetricsHub,
}

pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |ws| async move {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("connection", %id);
        if let Err(err) = handle_socket(state, ws).instrument(span).await {
            error!(connection = %id, error = %err, "websocket handler failed");
        }
    })
}

async fn handle_socket(state: Arc<AppState>, socket: WebSocket) -> Result<()> {
    let (mut sender, mut receiver) = socket.split();
    state.metrics.dialog.connections.inc();
    info!("client connected");

    let outcome = async {
        while let Some(message) = receiver.next().await {
            match message.context("websocket read failed")? {
                Message::Text(text) => {
                    debug!(payload = %text, "recv");
                    match handle_text(&state, &text).await {
                        Ok(reply) => {
                            sender
                                .send(Message::Text(reply))
                                .await
                                .context("websocket write failed")?;
                        }
                        Err(e) => {
                            state.metrics.dialog.malformed_frames.inc();
                            warn!(error = %e, "malformed payload, closing connection");
                            let _ = sender.send(Message::Close(None)).await;
                            break;
                        }
                    }
                }
                Message::Binary(data) => {
                    warn!(bytes = data.len(), "ignoring binary frame");
                }
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    state.metrics.dialog.connections.dec();
    info!("client disconnected");
    outcome
}

/// Decode one frame, run the engine and encode the reply
pub async fn handle_text(state: &AppState, text: &str) -> Result<String, ProtocolError> {
    let event = decode_event(text)?;
    let turn = state.engine.handle(&event).await;
    state.metrics.record(&turn, state.engine.store().len());
    turn.response.encode()
}
