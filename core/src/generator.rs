//! Seam to the external text-generation provider.
//!
//! The provider only ever sees a fully composed prompt. Topic detection and
//! the date stamp are computed here from the input, independent of whatever
//! text comes back.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use crate::error::GenerationError;
use crate::topic::detect_topic;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can turn a prompt into free-form advice text.
pub trait RecommendationGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Result of one generation attempt, already annotated for the reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(Recommendation),
    Failure { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recommendation {
    pub text: String,
    pub detected_topic: String,
    pub timestamp: String,
}

const COACHING_TEMPLATE: &str = "\
You are a professional fitness coach and exercise recommendation assistant.
Your role is to provide personalized exercise recommendations for specific body parts.

Guidelines:
- Provide 3-5 exercises for the requested body part
- Include proper form instructions
- Specify sets and reps (e.g., 3 sets of 12 reps)
- Consider exercises suitable for different fitness levels
- Add safety tips when relevant
- Keep recommendations concise but informative
- Vary recommendations daily to prevent monotony
- If the body part is unclear, ask for clarification

Body parts you can help with:
- Arms (biceps, triceps, forearms)
- Legs (quadriceps, hamstrings, calves)
- Core (abs, obliques, lower back)
- Chest
- Back (upper back, lower back)
- Shoulders
- Glutes
- Full body
";

/// Human-readable date used both in the prompt and in reply metadata.
pub fn date_stamp() -> String {
    Utc::now().format("%A, %B %d, %Y").to_string()
}

pub fn compose_prompt(utterance: &str, context: Option<&str>, date_stamp: &str) -> String {
    let mut prompt = format!(
        "{COACHING_TEMPLATE}\nToday's date: {date_stamp}\nBe encouraging and motivational!\n\nUser request: {utterance}"
    );
    if let Some(context) = context {
        prompt.push_str("\n\nContext: ");
        prompt.push_str(context);
    }
    prompt
}

/// Run one bounded generation attempt. Never retries and never panics on
/// provider failure; every failure comes back as [`GenerationOutcome::Failure`].
pub async fn recommend<G>(
    generator: &G,
    utterance: &str,
    context: Option<&str>,
    timeout: Duration,
) -> GenerationOutcome
where
    G: RecommendationGenerator,
{
    let timestamp = date_stamp();
    let prompt = compose_prompt(utterance, context, &timestamp);

    let result = match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout(timeout)),
    };

    match result {
        Ok(text) if !text.trim().is_empty() => GenerationOutcome::Success(Recommendation {
            text,
            detected_topic: detect_topic(utterance).to_string(),
            timestamp,
        }),
        Ok(_) => GenerationOutcome::Failure {
            reason: GenerationError::EmptyResponse.to_string(),
        },
        Err(err) => {
            tracing::warn!(
                event = "generation_failed",
                error = %err,
                "Recommendation generation failed"
            );
            GenerationOutcome::Failure {
                reason: err.to_string(),
            }
        }
    }
}
