// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface: the chat websocket and a health probe.

use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde_json::{Value, json};

use devmatch_chat::{ChatHandle, ws_handler};
use devmatch_core::HealthStatus;
use devmatch_embedding::EmbeddingHub;
use devmatch_recommendation::RecommendationHub;

/// Shared state of the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Instant,
    pub embedding: EmbeddingHub,
    pub recommendation: RecommendationHub,
    pub chat: ChatHandle,
}

/// Builds the router:
/// - `GET /ws/chat?id=<chat_id>&user_id=<user_id>` (websocket)
/// - `GET /health`
pub fn router(health: HealthState) -> Router {
    let chat = health.chat.clone();
    let chat_routes = Router::new()
        .route("/ws/chat", get(ws_handler))
        .with_state(chat);
    let health_routes = Router::new()
        .route("/health", get(get_health))
        .with_state(health);
    chat_routes.merge(health_routes)
}

fn status_str(status: &HealthStatus) -> (&'static str, Option<&str>) {
    match status {
        HealthStatus::Healthy => ("healthy", None),
        HealthStatus::Degraded(reason) => ("degraded", Some(reason)),
        HealthStatus::Unhealthy(reason) => ("unhealthy", Some(reason)),
    }
}

async fn get_health(State(state): State<HealthState>) -> (StatusCode, Json<Value>) {
    let embedding = state.embedding.health();
    let recommendation = state.recommendation.health();
    let chat = state.chat.health();
    let rooms = state.chat.room_count().await.ok();

    let down = [&embedding, &recommendation, &chat]
        .iter()
        .any(|s| matches!(s, HealthStatus::Unhealthy(_)));
    let code = if down {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let (embedding_status, embedding_reason) = status_str(&embedding);
    let (recommendation_status, recommendation_reason) = status_str(&recommendation);
    let (chat_status, chat_reason) = status_str(&chat);

    let body = json!({
        "status": if down { "unhealthy" } else { "ok" },
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "embedding": {
            "status": embedding_status,
            "reason": embedding_reason,
            "pending": state.embedding.pending(),
            "capacity": state.embedding.capacity(),
        },
        "recommendation": {
            "status": recommendation_status,
            "reason": recommendation_reason,
            "pending": state.recommendation.pending(),
            "capacity": state.recommendation.capacity(),
        },
        "chat": {
            "status": chat_status,
            "reason": chat_reason,
            "rooms": rooms,
        },
    });
    (code, Json(body))
}
