//! Protocol dispatcher: envelope in, reply out.
//!
//! Every request walks the same line (parse, extract, validate, generate,
//! format) and any failure jumps straight to formatting. Nothing escapes as
//! an unhandled fault: after the envelope is parsed, the rest of the pipeline
//! runs in its own task so even a panic comes back as an internal-error reply
//! in the caller's wire format.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use serde_json::Value;
use tokio::task::{JoinError, JoinHandle};

use crate::envelope::{Envelope, ProtocolVariant, RpcMethod};
use crate::error::DispatchError;
use crate::extract::extract_utterance;
use crate::format::{Reply, format_error, format_success};
use crate::generator::{
    DEFAULT_GENERATION_TIMEOUT, GenerationOutcome, Recommendation, RecommendationGenerator,
    recommend,
};
use crate::validate::validate_utterance;

#[derive(Clone, Debug)]
pub struct DispatchOptions {
    pub generation_timeout: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

/// A request that passed extraction and validation.
#[derive(Clone, Debug)]
pub struct CanonicalRequest {
    pub utterance: String,
    pub request_id: Option<Value>,
    pub variant: ProtocolVariant,
    pub context: Option<String>,
}

pub async fn dispatch<G>(
    body: &[u8],
    generator: Option<Arc<G>>,
    options: &DispatchOptions,
) -> Reply
where
    G: RecommendationGenerator + 'static,
{
    let envelope = match Envelope::parse(body) {
        Ok(envelope) => envelope,
        Err(rejection) => {
            tracing::info!(
                event = "a2a_request_rejected",
                variant = rejection.variant.as_str(),
                error = %rejection.error,
                "Request envelope rejected"
            );
            return format_error(&rejection.error, rejection.variant, rejection.id.as_ref());
        }
    };

    let variant = envelope.variant();
    let request_id = envelope.request_id().cloned();
    let timeout = options.generation_timeout;

    let pipeline = AbortOnDrop(tokio::spawn(async move {
        match run_pipeline(&envelope, generator.as_deref(), timeout).await {
            Ok(recommendation) => {
                format_success(&recommendation, variant, envelope.request_id())
            }
            Err(err) => {
                log_failure(&err, variant);
                format_error(&err, variant, envelope.request_id())
            }
        }
    }));

    match pipeline.await {
        Ok(reply) => reply,
        Err(join_err) => {
            let err = DispatchError::Internal(join_err.to_string());
            log_failure(&err, variant);
            format_error(&err, variant, request_id.as_ref())
        }
    }
}

/// Aborts the pipeline task when the caller stops waiting for it, so a
/// dropped request does not keep a provider call running.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Extract and validate the utterance of a `message/send` (or simple) request.
pub fn canonicalize(envelope: &Envelope) -> Result<CanonicalRequest, DispatchError> {
    if let Envelope::JsonRpc(call) = envelope {
        match &call.method {
            RpcMethod::MessageSend => {}
            RpcMethod::TaskSubscribe => {
                return Err(DispatchError::NotImplemented(
                    crate::envelope::METHOD_TASK_SUBSCRIBE.to_string(),
                ));
            }
            RpcMethod::Unknown(name) => return Err(DispatchError::MethodNotFound(name.clone())),
        }
    }

    let utterance = extract_utterance(envelope);
    let utterance = validate_utterance(utterance.as_deref())?.to_string();

    Ok(CanonicalRequest {
        utterance,
        request_id: envelope.request_id().cloned(),
        variant: envelope.variant(),
        context: envelope.context().map(ToOwned::to_owned),
    })
}

async fn run_pipeline<G>(
    envelope: &Envelope,
    generator: Option<&G>,
    timeout: Duration,
) -> Result<Recommendation, DispatchError>
where
    G: RecommendationGenerator,
{
    let request = canonicalize(envelope)?;

    tracing::info!(
        event = "a2a_request_accepted",
        variant = request.variant.as_str(),
        caller = envelope.caller_id(),
        utterance_chars = request.utterance.chars().count(),
        "Processing recommendation request"
    );
    tracing::debug!(utterance = %request.utterance, "Extracted utterance");

    let Some(generator) = generator else {
        return Err(DispatchError::AgentUnavailable);
    };

    match recommend(
        generator,
        &request.utterance,
        request.context.as_deref(),
        timeout,
    )
    .await
    {
        GenerationOutcome::Success(recommendation) => {
            tracing::info!(
                event = "a2a_request_completed",
                body_part = %recommendation.detected_topic,
                "Generated recommendation"
            );
            Ok(recommendation)
        }
        GenerationOutcome::Failure { reason } => Err(DispatchError::Generation(reason)),
    }
}

fn log_failure(err: &DispatchError, variant: ProtocolVariant) {
    if err.class().is_client_error() {
        tracing::info!(
            event = "a2a_request_failed",
            variant = variant.as_str(),
            code = err.rpc_code(),
            error = %err,
            "Request rejected"
        );
    } else {
        tracing::error!(
            event = "a2a_request_failed",
            variant = variant.as_str(),
            code = err.rpc_code(),
            error = %err,
            "Request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AGENT_UNAVAILABLE_MESSAGE, GENERATION_APOLOGY, INTERNAL_APOLOGY, codes};
    use crate::generator::testing::{HangingGenerator, RecordingGenerator, StubGenerator};
    use serde_json::json;

    fn reply_generator() -> Option<Arc<StubGenerator>> {
        Some(Arc::new(StubGenerator::Reply(
            "1. Squats\n2. Lunges\n3. Calf raises".to_string(),
        )))
    }

    async fn send<G>(body: Value, generator: Option<Arc<G>>) -> (u16, Value)
    where
        G: RecommendationGenerator + 'static,
    {
        let reply = dispatch(
            body.to_string().as_bytes(),
            generator,
            &DispatchOptions::default(),
        )
        .await;
        (reply.status, reply.to_value())
    }

    fn rpc_send(id: Value, text: &str) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "message/send",
            "params": { "message": { "parts": [{ "kind": "text", "text": text }] } }
        })
    }

    #[tokio::test]
    async fn simple_request_succeeds_with_metadata() {
        let (status, body) = send(json!({ "message": "arms" }), reply_generator()).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], json!("success"));
        assert!(!body["response"].as_str().unwrap().is_empty());
        assert_eq!(body["metadata"]["body_part"], json!("arms"));
        assert!(body.get("jsonrpc").is_none());
    }

    #[tokio::test]
    async fn jsonrpc_request_echoes_id_with_single_text_part() {
        let (status, body) = send(rpc_send(json!("7"), "<p>legs</p>"), reply_generator()).await;
        assert_eq!(status, 200);
        assert_eq!(body["jsonrpc"], json!("2.0"));
        assert_eq!(body["id"], json!("7"));
        let parts = body["result"]["message"]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["kind"], json!("text"));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn jsonrpc_request_without_id_gets_one() {
        let mut request = rpc_send(json!(null), "chest");
        request.as_object_mut().unwrap().remove("id");
        let (_, body) = send(request, reply_generator()).await;
        assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn subscribe_is_not_implemented_and_never_generates() {
        let generator = Arc::new(RecordingGenerator::default());
        let (status, body) = send(
            json!({ "jsonrpc": "2.0", "id": "s1", "method": "task/subscribe", "params": {} }),
            Some(generator.clone()),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["id"], json!("s1"));
        assert_eq!(body["error"]["code"], json!(codes::METHOD_NOT_FOUND));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (status, body) = send(
            json!({ "jsonrpc": "2.0", "id": 3, "method": "tasks/cancel" }),
            reply_generator(),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["id"], json!(3));
        assert_eq!(body["error"]["message"], json!("Method not found: tasks/cancel"));
    }

    #[tokio::test]
    async fn unparsable_body_never_generates() {
        let generator = Arc::new(RecordingGenerator::default());

        let reply = dispatch(
            br#"{"jsonrpc":"2.0","id":"9","method":"message/send","params":"#,
            Some(generator.clone()),
            &DispatchOptions::default(),
        )
        .await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.to_value()["error"]["code"], json!(codes::PARSE_ERROR));

        let reply = dispatch(b"{oops", Some(generator.clone()), &DispatchOptions::default()).await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.to_value()["status"], json!("error"));

        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_utterance_is_invalid_params_and_never_generates() {
        let generator = Arc::new(RecordingGenerator::default());
        let (status, body) = send(
            json!({
                "jsonrpc": "2.0",
                "id": "e",
                "method": "message/send",
                "params": { "message": { "parts": [{ "kind": "file" }] } }
            }),
            Some(generator.clone()),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], json!(codes::INVALID_PARAMS));
        assert!(body["error"]["message"].as_str().unwrap().contains("body part"));

        let (status, body) =
            send(json!({ "message": { "parts": [] } }), Some(generator.clone())).await;
        assert_eq!(status, 400);
        assert!(body["response"].as_str().unwrap().contains("body part"));

        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_utterance_is_rejected_in_both_variants() {
        let generator = Arc::new(RecordingGenerator::default());
        let long = "x".repeat(501);
        let (status, body) = send(rpc_send(json!(1), &long), Some(generator.clone())).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], json!(codes::INVALID_PARAMS));

        let (status, body) = send(json!({ "message": long }), Some(generator.clone())).await;
        assert_eq!(status, 400);
        assert!(body["response"].as_str().unwrap().contains("too long"));

        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generator_failure_is_apology_with_internal_code() {
        let generator = Some(Arc::new(StubGenerator::Fail("API key leaked-123 invalid".into())));
        let (status, body) = send(rpc_send(json!("g"), "back"), generator.clone()).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"]["code"], json!(codes::INTERNAL_ERROR));
        assert_eq!(body["error"]["message"], json!(GENERATION_APOLOGY));
        assert!(!body.to_string().contains("leaked-123"));

        let (status, body) = send(json!({ "message": "back" }), generator).await;
        assert_eq!(status, 500);
        assert_eq!(body["response"], json!(GENERATION_APOLOGY));
    }

    #[tokio::test]
    async fn uninitialized_generator_is_agent_error() {
        let (status, body) = send::<StubGenerator>(rpc_send(json!("u"), "core"), None).await;
        assert_eq!(status, 500);
        assert_eq!(body["id"], json!("u"));
        assert_eq!(body["error"]["code"], json!(codes::AGENT_ERROR));
        assert_eq!(body["error"]["message"], json!(AGENT_UNAVAILABLE_MESSAGE));
    }

    #[tokio::test]
    async fn panicking_generator_becomes_internal_error() {
        let generator = Some(Arc::new(StubGenerator::Panic));
        let (status, body) = send(rpc_send(json!("p"), "glutes"), generator).await;
        assert_eq!(status, 500);
        assert_eq!(body["id"], json!("p"));
        assert_eq!(body["error"]["code"], json!(codes::INTERNAL_ERROR));
        assert_eq!(body["error"]["message"], json!(INTERNAL_APOLOGY));
    }

    #[tokio::test]
    async fn context_metadata_reaches_generator() {
        let generator = Arc::new(RecordingGenerator::default());
        let request = json!({
            "jsonrpc": "2.0",
            "id": "c",
            "method": "message/send",
            "params": {
                "message": {
                    "parts": [{ "kind": "text", "text": "shoulders" }],
                    "metadata": { "context": "rehabbing a rotator cuff" }
                }
            }
        });
        let (status, _) = send(request, Some(generator.clone())).await;
        assert_eq!(status, 200);
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Context: rehabbing a rotator cuff"));
    }

    #[tokio::test]
    async fn dropped_dispatch_cancels_generation() {
        let generator = Arc::new(HangingGenerator::default());
        let options = DispatchOptions {
            generation_timeout: Duration::from_secs(60),
        };
        let body = rpc_send(json!("d"), "legs").to_string();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            dispatch(body.as_bytes(), Some(generator.clone()), &options),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(generator.started());

        for _ in 0..100 {
            if generator.cancelled() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(generator.cancelled());
    }

    #[test]
    fn canonical_request_carries_variant_and_id() {
        let envelope =
            Envelope::parse(rpc_send(json!("7"), " <p>legs</p> ").to_string().as_bytes()).unwrap();
        let request = canonicalize(&envelope).unwrap();
        assert_eq!(request.utterance, "legs");
        assert_eq!(request.request_id, Some(json!("7")));
        assert_eq!(request.variant, ProtocolVariant::JsonRpc);
    }
}
