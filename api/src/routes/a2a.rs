use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use exercise_agent_core::{ReplyBody, dispatch};

use crate::state::AppState;

pub const A2A_PATH: &str = "/a2a/agent/exerciseAgent";

pub fn router() -> Router<AppState> {
    Router::new().route(A2A_PATH, post(handle_a2a))
}

/// Single A2A entry point. The body is taken raw so malformed JSON still gets
/// a protocol-shaped error instead of an extractor rejection.
#[utoipa::path(
    post,
    path = "/a2a/agent/exerciseAgent",
    request_body(
        content = String,
        content_type = "application/json",
        description = "JSON-RPC 2.0 `message/send` call or a legacy simple envelope"
    ),
    responses(
        (status = 200, description = "Exercise recommendation", body = ReplyBody),
        (status = 400, description = "Parse error, invalid request or invalid utterance", body = ReplyBody),
        (status = 404, description = "Unknown or unimplemented method", body = ReplyBody),
        (status = 500, description = "Generation failure or agent not initialized", body = ReplyBody)
    ),
    tag = "a2a"
)]
pub async fn handle_a2a(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<ReplyBody>) {
    let reply = dispatch(&body, state.generator.clone(), &state.dispatch).await;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body))
}
