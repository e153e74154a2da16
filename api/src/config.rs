use std::time::Duration;

use clap::Parser;

pub const MAX_GENERATION_TIMEOUT_SECS: u64 = 3600;

/// Process configuration. Every flag can also be set from the environment
/// (a `.env` file is loaded first in development).
#[derive(Parser, Clone, Debug)]
#[command(
    name = "exercise-agent-api",
    version,
    about = "Exercise recommendation agent: A2A endpoint for chat platforms"
)]
pub struct AgentConfig {
    /// Gemini API key. Without it the agent starts but reports "not initialized".
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model used for recommendations
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-pro-latest")]
    pub gemini_model: String,

    /// Base URL of the Gemini REST API
    #[arg(
        long,
        env = "GEMINI_API_URL",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub gemini_api_url: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Public base URL advertised in the agent card (derived from the request if unset)
    #[arg(long, env = "AGENT_BASE_URL")]
    pub base_url: Option<String>,

    /// Verbose logging
    #[arg(long, env = "AGENT_DEBUG")]
    pub debug: bool,

    /// Upper bound for one generation call, in seconds
    #[arg(
        long,
        env = "GENERATION_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=MAX_GENERATION_TIMEOUT_SECS)
    )]
    pub generation_timeout_secs: u64,

    /// Comma-separated list of allowed CORS origins
    #[arg(long, env = "AGENT_CORS_ORIGINS", default_value = "https://telex.im")]
    pub cors_origins: String,
}

impl AgentConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(
            self.generation_timeout_secs
                .clamp(1, MAX_GENERATION_TIMEOUT_SECS),
        )
    }

    pub fn gemini_configured(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Base URL override without a trailing slash, ignoring blank values.
    pub fn base_url_override(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| value.trim_end_matches('/').to_string())
    }

    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "exercise_agent_api=debug,exercise_agent_core=debug,tower_http=debug"
        } else {
            "exercise_agent_api=info,exercise_agent_core=info,tower_http=info"
        }
    }
}
