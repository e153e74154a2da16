pub mod a2a;
pub mod agent_card;
pub mod health;

use axum::http::Uri;

use crate::error::AppError;

/// Fallback for every route the agent does not serve.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        path: uri.path().to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response};
    use clap::Parser;
    use serde_json::Value;

    use crate::config::AgentConfig;
    use crate::gemini::GeminiClient;
    use crate::state::AppState;

    /// State built from CLI-style args; a key yields an initialized (but
    /// never called) Gemini client. Key and base URL default to blank so the
    /// host environment cannot leak in.
    pub fn state(args: &[&str]) -> AppState {
        let mut argv = vec!["exercise-agent-api"];
        for flag in ["--gemini-api-key", "--base-url"] {
            if !args.contains(&flag) {
                argv.extend_from_slice(&[flag, ""]);
            }
        }
        argv.extend_from_slice(args);
        let config = AgentConfig::try_parse_from(argv).expect("config should parse");
        let generator = GeminiClient::from_config(&config).ok();
        AppState::new(config, generator)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build")
    }

    pub fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .expect("request should build")
    }

    pub async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }
}
