use std::time::Duration;

use thiserror::Error;

/// JSON-RPC 2.0 error codes emitted by the agent.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Generic agent error carried over from the legacy simple format.
    pub const AGENT_ERROR: i64 = -32000;
}

pub const GENERATION_APOLOGY: &str = "I apologize, but I'm having trouble processing your request. \
     Please try again or rephrase your message.";
pub const INTERNAL_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";
pub const AGENT_UNAVAILABLE_MESSAGE: &str =
    "Agent not initialized. Check GEMINI_API_KEY configuration.";

/// Coarse error families. Client classes are never retried; server classes
/// are surfaced with an apology instead of the internal reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Parse,
    Protocol,
    Input,
    Generation,
    Internal,
}

impl ErrorClass {
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::Parse | Self::Protocol | Self::Input)
    }
}

/// Why an utterance was rejected before generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidUtterance {
    #[error("Please provide a body part to exercise (e.g., 'arms', 'legs', 'chest', 'back')")]
    MissingBodyPart,
    #[error("Message too long. Please keep it under {limit} characters")]
    TooLong { length: usize, limit: usize },
}

/// Failure of the external text-generation step.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider request failed: {0}")]
    Provider(String),
    #[error("provider returned status {status}: {body}")]
    ProviderStatus { status: u16, body: String },
    #[error("provider returned no text")]
    EmptyResponse,
}

/// Everything that can stop a request before a successful reply.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Method not implemented: {0}")]
    NotImplemented(String),
    #[error(transparent)]
    InvalidParams(#[from] InvalidUtterance),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("recommendation generator is not initialized")]
    AgentUnavailable,
    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Parse(_) => ErrorClass::Parse,
            Self::InvalidRequest(_) | Self::MethodNotFound(_) | Self::NotImplemented(_) => {
                ErrorClass::Protocol
            }
            Self::InvalidParams(_) => ErrorClass::Input,
            Self::Generation(_) => ErrorClass::Generation,
            Self::AgentUnavailable | Self::Internal(_) => ErrorClass::Internal,
        }
    }

    pub fn rpc_code(&self) -> i64 {
        match self {
            Self::Parse(_) => codes::PARSE_ERROR,
            Self::InvalidRequest(_) => codes::INVALID_REQUEST,
            Self::MethodNotFound(_) | Self::NotImplemented(_) => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::Generation(_) | Self::Internal(_) => codes::INTERNAL_ERROR,
            Self::AgentUnavailable => codes::AGENT_ERROR,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::Parse(_) | Self::InvalidRequest(_) | Self::InvalidParams(_) => 400,
            Self::MethodNotFound(_) | Self::NotImplemented(_) => 404,
            Self::Generation(_) | Self::AgentUnavailable | Self::Internal(_) => 500,
        }
    }

    /// Text returned to the caller. Server-side reasons stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(_) => "Parse error: request body must be a non-empty JSON object".to_string(),
            Self::InvalidRequest(reason) => format!("Invalid Request: {reason}"),
            Self::MethodNotFound(_) | Self::NotImplemented(_) | Self::InvalidParams(_) => {
                self.to_string()
            }
            Self::Generation(_) => GENERATION_APOLOGY.to_string(),
            Self::AgentUnavailable => AGENT_UNAVAILABLE_MESSAGE.to_string(),
            Self::Internal(_) => INTERNAL_APOLOGY.to_string(),
        }
    }
}

impl From<GenerationError> for DispatchError {
    fn from(err: GenerationError) -> Self {
        DispatchError::Generation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx_and_protocol_codes() {
        let cases = [
            (DispatchError::Parse("eof".into()), codes::PARSE_ERROR, 400),
            (
                DispatchError::InvalidRequest("method is required".into()),
                codes::INVALID_REQUEST,
                400,
            ),
            (
                DispatchError::MethodNotFound("tasks/get".into()),
                codes::METHOD_NOT_FOUND,
                404,
            ),
            (
                DispatchError::NotImplemented("task/subscribe".into()),
                codes::METHOD_NOT_FOUND,
                404,
            ),
            (
                DispatchError::InvalidParams(InvalidUtterance::MissingBodyPart),
                codes::INVALID_PARAMS,
                400,
            ),
        ];
        for (err, code, status) in cases {
            assert!(err.class().is_client_error(), "{err:?}");
            assert_eq!(err.rpc_code(), code, "{err:?}");
            assert_eq!(err.http_status(), status, "{err:?}");
        }
    }

    #[test]
    fn server_errors_hide_internal_reason() {
        let err = DispatchError::from(GenerationError::Provider("quota exceeded for key abc".into()));
        assert_eq!(err.class(), ErrorClass::Generation);
        assert_eq!(err.rpc_code(), codes::INTERNAL_ERROR);
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.user_message(), GENERATION_APOLOGY);
        assert!(!err.user_message().contains("quota"));

        let internal = DispatchError::Internal("worker panicked".into());
        assert_eq!(internal.user_message(), INTERNAL_APOLOGY);
        assert!(!internal.class().is_client_error());
    }

    #[test]
    fn unavailable_agent_uses_legacy_agent_code() {
        let err = DispatchError::AgentUnavailable;
        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(err.rpc_code(), codes::AGENT_ERROR);
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn too_long_message_names_the_limit() {
        let err = DispatchError::from(InvalidUtterance::TooLong {
            length: 501,
            limit: 500,
        });
        assert_eq!(
            err.user_message(),
            "Message too long. Please keep it under 500 characters"
        );
    }
}
