//! WebSocket handler
//!
//! Each socket runs three tasks: one reads frames and feeds the engine, one
//! drains the connection's outbound queue into the socket, one watches the
//! heartbeat. Whichever ends first ends the connection, and cleanup always
//! goes through the engine's `Disconnect`.

use crate::connection::Connection;
use crate::handlers::MessageDispatcher;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use chat_core::ConnectionId;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;

/// How long the writer gets to flush after the connection is closed
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket gateway handler
pub async fn gateway_handler(State(state): State<GatewayState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let connection_id = ConnectionId::generate();
    let gateway = &state.config().gateway;

    let (tx, mut rx) = mpsc::channel::<GatewayMessage>(gateway.outbound_buffer.max(1));
    let connection = Connection::new(connection_id.clone(), tx);

    match state.engine().connect(connection.clone()).await {
        Ok(true) => {}
        Ok(false) => return,
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Rejecting connection");
            return;
        }
    }

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Hello goes out before anything the engine queued
    let hello = GatewayMessage::hello(HelloPayload::with_interval(gateway.heartbeat_interval_ms));
    if let Ok(json) = hello.to_json() {
        if ws_sink.send(Message::Text(json.into())).await.is_err() {
            tracing::debug!(connection_id = %connection_id, "Failed to send Hello message");
            cleanup_connection(&state, &connection_id).await;
            return;
        }
    }

    let state_recv = state.clone();
    let connection_recv = connection.clone();

    let mut recv_task = tokio::spawn(async move {
        let id = connection_recv.id().clone();
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) = handle_text_message(&state_recv, &connection_recv, &text).await {
                        tracing::debug!(
                            connection_id = %id,
                            close_code = %close_code,
                            "Closing connection due to error"
                        );
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(connection_id = %id, "Binary messages not supported");
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong is handled automatically by axum
                    tracing::trace!(connection_id = %id, "Ping/pong received");
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %id, "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %id, error = %e, "WebSocket error");
                    return None;
                }
            }
        }
        None
    });

    let (close_tx, mut close_rx) = oneshot::channel::<CloseCode>();
    let connection_id_send = connection_id.clone();

    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                code = &mut close_rx => {
                    if let Ok(code) = code {
                        let (code, reason) = GatewayMessage::close_frame(code);
                        let frame = CloseFrame { code, reason: reason.into() };
                        let _ = ws_sink.send(Message::Close(Some(frame))).await;
                    }
                    break;
                }
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    match msg.to_json() {
                        Ok(json) => {
                            if ws_sink.send(Message::Text(json.into())).await.is_err() {
                                tracing::debug!(
                                    connection_id = %connection_id_send,
                                    "Failed to send message to WebSocket"
                                );
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                connection_id = %connection_id_send,
                                error = %e,
                                "Failed to encode outbound message"
                            );
                        }
                    }
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    let connection_hb = connection.clone();
    let check_every = (gateway.heartbeat_interval() / 2).max(Duration::from_millis(10));
    let timeout = gateway.heartbeat_timeout();

    let mut heartbeat_task = tokio::spawn(async move {
        let mut check_interval = interval(check_every);

        loop {
            check_interval.tick().await;

            let time_since = connection_hb.time_since_heartbeat();
            if time_since > timeout {
                tracing::info!(
                    connection_id = %connection_hb.id(),
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                return CloseCode::SessionTimeout;
            }
        }
    });

    // Wait for any task to complete
    let (close_code, send_done) = tokio::select! {
        result = &mut recv_task => (result.ok().flatten(), false),
        _ = &mut send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
            (None, true)
        }
        result = &mut heartbeat_task => (result.ok(), false),
    };

    recv_task.abort();
    heartbeat_task.abort();

    if let Some(code) = close_code {
        let _ = close_tx.send(code);
    }

    cleanup_connection(&state, &connection_id).await;

    // Disconnect dropped the queue's sender, so the writer drains and stops
    if !send_done && tokio::time::timeout(FLUSH_TIMEOUT, &mut send_task).await.is_err() {
        tracing::debug!(connection_id = %connection_id, "Writer did not finish, aborting");
        send_task.abort();
    }
}

/// Handle a text message from the client
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) -> Result<(), CloseCode> {
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Failed to parse message"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    tracing::trace!(
        connection_id = %connection.id(),
        op = %message.op,
        "Received message"
    );

    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Handler error"
            );
            Err(e.to_close_code().unwrap_or(CloseCode::UnknownError))
        }
    }
}

/// Run the `Disconnect` transition for a closed transport
async fn cleanup_connection(state: &GatewayState, connection_id: &ConnectionId) {
    match state.engine().disconnect(connection_id.clone()).await {
        Ok(Some(identity)) => {
            tracing::debug!(connection_id = %connection_id, user_id = %identity.user_id, "Cleaned up connection");
        }
        Ok(None) => {
            tracing::debug!(connection_id = %connection_id, "Cleaned up connection that never joined");
        }
        Err(e) => {
            // Already dropped as lagging, or the engine is shutting down
            tracing::debug!(connection_id = %connection_id, error = %e, "Connection already gone");
        }
    }
}
