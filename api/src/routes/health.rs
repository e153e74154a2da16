use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::routes::a2a::A2A_PATH;
use crate::state::AppState;

pub const AGENT_DISPLAY_NAME: &str = "Exercise Recommendation Agent";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// "healthy" or "not initialized"
    pub agent_status: String,
    pub gemini_configured: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ServiceEndpoints {
    pub a2a: String,
    pub health: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub status: String,
    pub agent: String,
    pub version: String,
    pub endpoints: ServiceEndpoints,
}

/// Liveness plus generator readiness. Always 200: a missing provider key is
/// reported, not treated as downtime.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        agent_status: state.agent_status().to_string(),
        gemini_configured: state.config.gemini_configured(),
    })
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = ServiceInfo)
    ),
    tag = "system"
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "running".to_string(),
        agent: AGENT_DISPLAY_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ServiceEndpoints {
            a2a: A2A_PATH.to_string(),
            health: "/health".to_string(),
        },
    })
}
