//! `WebSocket` transport for the real-time channel.
//!
//! Clients connect to `GET /ws`. Each connection task does two things at
//! once: it forwards every frame from the shared broadcast channel to its
//! socket, and it hands every inbound text frame to the [`Dispatcher`].
//! A failed dispatch is answered with an `error` frame on this socket only.
//!
//! If a client falls behind, lagged frames are silently skipped and the
//! client resumes from the most recent one.
//!
//! [`Dispatcher`]: crate::dispatcher::Dispatcher

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use sensorcast_events::{OutboundEvent, ServerFrame};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drive one connection until the client leaves or the channel closes.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let conn = Uuid::new_v4();
    info!(%conn, "Client connected");

    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(frame) => {
                        if !send_frame(&mut socket, &frame).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(%conn, skipped = n, "Client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!(%conn, "Broadcast channel closed");
                        break;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(err) = state.dispatcher.dispatch_text(text.as_str()).await {
                            report(conn, &err);
                            let reply = OutboundEvent::Error(err.notice()).into_frame();
                            match reply {
                                Ok(frame) => {
                                    if !send_frame(&mut socket, &frame).await {
                                        break;
                                    }
                                }
                                Err(e) => warn!(%conn, "Failed to encode error frame: {e}"),
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(%conn, "WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }

    info!(%conn, "Client disconnected");
}

/// Send one frame. Returns `false` once the socket is gone.
async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame) -> bool {
    let json = match frame.to_json() {
        Ok(j) => j,
        Err(e) => {
            warn!(event = %frame.event, "Failed to serialize frame: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

fn report(conn: Uuid, err: &DispatchError) {
    let event = err.event().unwrap_or("-");
    if err.is_client_error() {
        warn!(%conn, event, "Event rejected: {err}");
    } else {
        error!(%conn, event, "Event failed: {err}");
    }
}
