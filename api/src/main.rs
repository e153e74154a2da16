use std::net::SocketAddr;

use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

mod config;
mod error;
mod gemini;
mod middleware;
mod routes;
mod state;

use config::AgentConfig;
use gemini::GeminiClient;
use state::AppState;

/// Largest accepted request body. A maximal utterance plus envelope fits easily.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exercise Recommendation Agent",
        version = "0.1.0",
        description = "A2A agent that turns a chat message naming a body part into exercise recommendations."
    ),
    paths(
        routes::health::service_info,
        routes::health::health_check,
        routes::agent_card::agent_card,
        routes::a2a::handle_a2a,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::health::ServiceInfo,
        routes::health::ServiceEndpoints,
        routes::agent_card::AgentCard,
        routes::agent_card::AgentCapabilities,
        routes::agent_card::AgentCardMetadata,
        error::ErrorBody,
        exercise_agent_core::format::ReplyBody,
        exercise_agent_core::format::ReplyStatus,
        exercise_agent_core::format::ReplyMetadata,
        exercise_agent_core::format::SimpleReply,
        exercise_agent_core::format::JsonRpcReply,
        exercise_agent_core::format::MessageResult,
        exercise_agent_core::format::AgentMessage,
        exercise_agent_core::format::TextPart,
        exercise_agent_core::format::RpcErrorBody,
    ))
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full router. The A2A limiter keys on the peer address, so it is only
/// attached when the server runs with connect info.
fn build_app(state: AppState, rate_limited: bool) -> Router {
    let a2a = if rate_limited {
        routes::a2a::router().layer(middleware::rate_limit::a2a_layer())
    } else {
        routes::a2a::router()
    };
    let cors_layer = middleware::cors::build_cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(routes::health::router())
        .merge(routes::agent_card::router())
        .merge(a2a)
        .fallback(routes::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(error::panic_response))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(axum::middleware::from_fn(middleware::security_headers::apply))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    let config = AgentConfig::parse();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let generator = match GeminiClient::from_config(&config) {
        Ok(client) => {
            tracing::info!(
                event = "agent_initialized",
                model = %client.model(),
                "Recommendation agent initialized"
            );
            Some(client)
        }
        Err(err) => {
            tracing::warn!(event = "agent_init_failed", error = %err, "Failed to initialize agent");
            None
        }
    };

    let port = config.port;
    let state = AppState::new(config, generator);
    let app = build_app(state, true);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(event = "bind_failed", error = %err, %addr, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(event = "listening", %addr, "Exercise agent listening");

    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(event = "server_terminated", error = %err, "Server terminated");
        std::process::exit(1);
    }
}
