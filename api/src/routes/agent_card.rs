use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use axum::{Json, Router, routing::get};
use exercise_agent_core::envelope::METHOD_MESSAGE_SEND;
use serde::Serialize;

use crate::routes::a2a::A2A_PATH;
use crate::routes::health::AGENT_DISPLAY_NAME;
use crate::state::AppState;

const AGENT_DESCRIPTION: &str = "Recommends 3-5 exercises with sets, reps and safety notes \
     for a requested body part. Ask for arms, legs, core, chest, back, shoulders, glutes or full body.";
const AGENT_TAGS: [&str; 4] = ["fitness", "exercise", "workout", "coaching"];

pub fn router() -> Router<AppState> {
    Router::new().route("/.well-known/agent.json", get(agent_card))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AgentCardMetadata {
    pub tags: Vec<String>,
    pub model: Option<String>,
}

/// Static capability descriptor consumed by the chat platform.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub version: String,
    pub url: String,
    pub endpoint: String,
    pub capabilities: AgentCapabilities,
    pub methods: Vec<String>,
    pub metadata: AgentCardMetadata,
}

#[utoipa::path(
    get,
    path = "/.well-known/agent.json",
    responses(
        (status = 200, description = "Agent capability descriptor", body = AgentCard)
    ),
    tag = "a2a"
)]
pub async fn agent_card(State(state): State<AppState>, headers: HeaderMap) -> Json<AgentCard> {
    let base = state
        .config
        .base_url_override()
        .unwrap_or_else(|| request_base_url(&headers, state.config.port));

    Json(AgentCard {
        name: AGENT_DISPLAY_NAME.to_string(),
        description: AGENT_DESCRIPTION.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoint: format!("{base}{A2A_PATH}"),
        url: base,
        capabilities: AgentCapabilities {
            streaming: false,
            push_notifications: false,
        },
        methods: vec![METHOD_MESSAGE_SEND.to_string()],
        metadata: AgentCardMetadata {
            tags: AGENT_TAGS.iter().map(|tag| tag.to_string()).collect(),
            model: state
                .generator
                .as_ref()
                .map(|generator| generator.model().to_string()),
        },
    })
}

/// Public base URL as seen by the caller, honoring reverse-proxy headers.
fn request_base_url(headers: &HeaderMap, port: u16) -> String {
    let forwarded_proto = first_header_token(headers, "x-forwarded-proto");
    let forwarded_host = first_header_token(headers, "x-forwarded-host");
    let host = forwarded_host.or_else(|| {
        headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
    });

    if let Some(host) = host {
        let proto = forwarded_proto.unwrap_or_else(|| {
            if host.contains("localhost") || host.starts_with("127.0.0.1") {
                "http".to_string()
            } else {
                "https".to_string()
            }
        });
        return format!("{}://{}", proto.trim_end_matches(':'), host);
    }

    format!("http://127.0.0.1:{port}")
}

fn first_header_token(headers: &HeaderMap, key: &str) -> Option<String> {
    headers
        .get(key)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
