//! Reply envelopes, shaped after the variant of the request they answer.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::envelope::{JSONRPC_VERSION, ProtocolVariant};
use crate::error::DispatchError;
use crate::generator::Recommendation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ReplyMetadata {
    pub body_part: String,
    pub timestamp: String,
}

/// Flat reply used for legacy (non JSON-RPC) requests.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SimpleReply {
    pub status: ReplyStatus,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReplyMetadata>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TextPart {
    pub kind: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct AgentMessage {
    pub role: String,
    pub parts: Vec<TextPart>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MessageResult {
    pub message: AgentMessage,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC 2.0 response carrying either `result` or `error`.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct JsonRpcReply {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MessageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ReplyBody {
    JsonRpc(JsonRpcReply),
    Simple(SimpleReply),
}

/// A formatted reply plus the HTTP status it must be sent with.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: ReplyBody,
}

impl Reply {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.body).unwrap_or(Value::Null)
    }
}

/// Echo the inbound id; mint one only when the request carried none.
pub fn resolve_request_id(id: Option<&Value>) -> Value {
    match id {
        Some(id) => id.clone(),
        None => Value::String(Uuid::now_v7().to_string()),
    }
}

pub fn format_success(
    recommendation: &Recommendation,
    variant: ProtocolVariant,
    request_id: Option<&Value>,
) -> Reply {
    let body = match variant {
        ProtocolVariant::JsonRpc => ReplyBody::JsonRpc(JsonRpcReply {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: resolve_request_id(request_id),
            result: Some(MessageResult {
                message: AgentMessage {
                    role: "assistant".to_string(),
                    parts: vec![TextPart {
                        kind: "text".to_string(),
                        text: recommendation.text.clone(),
                    }],
                },
            }),
            error: None,
        }),
        ProtocolVariant::Simple => ReplyBody::Simple(SimpleReply {
            status: ReplyStatus::Success,
            response: recommendation.text.clone(),
            metadata: Some(ReplyMetadata {
                body_part: recommendation.detected_topic.clone(),
                timestamp: recommendation.timestamp.clone(),
            }),
        }),
    };

    Reply { status: 200, body }
}

pub fn format_error(
    error: &DispatchError,
    variant: ProtocolVariant,
    request_id: Option<&Value>,
) -> Reply {
    let message = error.user_message();
    let body = match variant {
        ProtocolVariant::JsonRpc => ReplyBody::JsonRpc(JsonRpcReply {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: resolve_request_id(request_id),
            result: None,
            error: Some(RpcErrorBody {
                code: error.rpc_code(),
                message,
            }),
        }),
        ProtocolVariant::Simple => ReplyBody::Simple(SimpleReply {
            status: ReplyStatus::Error,
            response: message,
            metadata: None,
        }),
    };

    Reply {
        status: error.http_status(),
        body,
    }
}
