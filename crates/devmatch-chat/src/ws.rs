// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Websocket upgrade handler for chat rooms.
//!
//! `GET /ws/chat?id=<chat_id>&user_id=<user_id>` joins the room `chat_id`.

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use serde::Deserialize;
use tracing::warn;

use crate::hub::ChatHandle;
use crate::pump::run_client;

/// Query parameters of the upgrade request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatParams {
    /// Room to join.
    pub id: String,
    pub user_id: String,
}

/// Upgrades the connection and attaches it to the requested room.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ChatParams>,
    State(hub): State<ChatHandle>,
) -> Response {
    if params.id.is_empty() || params.user_id.is_empty() {
        return (StatusCode::BAD_REQUEST, "id and user_id are required").into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, params, hub))
}

async fn handle_socket(socket: WebSocket, params: ChatParams, hub: ChatHandle) {
    let (client, outbound) = match hub.register(params.id, params.user_id) {
        Ok(registered) => registered,
        Err(e) => {
            warn!(error = %e, "rejecting chat connection");
            return;
        }
    };
    let (sink, stream) = socket.split();
    run_client(stream, sink, client, outbound, hub).await;
}
