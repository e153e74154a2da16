use std::sync::Arc;

use exercise_agent_core::DispatchOptions;

use crate::config::AgentConfig;
use crate::gemini::GeminiClient;

/// Shared, read-only per-process state. The generator is built once at startup
/// and stays `None` when it could not be initialized.
#[derive(Clone)]
pub struct AppState {
    pub generator: Option<Arc<GeminiClient>>,
    pub config: Arc<AgentConfig>,
    pub dispatch: DispatchOptions,
}

impl AppState {
    pub fn new(config: AgentConfig, generator: Option<GeminiClient>) -> Self {
        let dispatch = DispatchOptions {
            generation_timeout: config.generation_timeout(),
        };
        Self {
            generator: generator.map(Arc::new),
            config: Arc::new(config),
            dispatch,
        }
    }

    pub fn agent_status(&self) -> &'static str {
        if self.generator.is_some() {
            "healthy"
        } else {
            "not initialized"
        }
    }
}
