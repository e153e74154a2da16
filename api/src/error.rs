use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Failures outside the A2A dispatcher (which formats its own errors).
#[derive(Debug)]
pub enum AppError {
    /// Unknown route (404)
    NotFound { path: String },
    /// Internal error (500)
    Internal(String),
}

/// Body shape shared with the legacy simple format.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub status: String,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound { path } => {
                tracing::debug!(path = %path, "Unknown endpoint requested");
                (StatusCode::NOT_FOUND, "Endpoint not found")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(ErrorBody {
                status: "error".to_string(),
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// Handler for `CatchPanicLayer`: a panic outside the dispatcher still answers
/// with the structured 500 body.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::get;
    use serde_json::json;
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    use super::*;
    use crate::routes::testing::{get as get_request, json_body};

    async fn explode() -> StatusCode {
        panic!("boom")
    }

    #[tokio::test]
    async fn panics_become_structured_500() {
        let app = Router::new()
            .route("/explode", get(explode))
            .layer(CatchPanicLayer::custom(panic_response));
        let response = app
            .oneshot(get_request("/explode"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "status": "error", "error": "Internal server error" })
        );
    }
}
