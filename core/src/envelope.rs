//! Tagged parse of the inbound envelope.
//!
//! The chat platform posts either a JSON-RPC 2.0 call or a legacy "simple"
//! object. Both are decoded exactly once here; everything downstream works on
//! [`Envelope`] instead of probing optional keys of a raw `Value`.

use serde_json::{Map, Value};

use crate::error::DispatchError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const METHOD_MESSAGE_SEND: &str = "message/send";
pub const METHOD_TASK_SUBSCRIBE: &str = "task/subscribe";

/// Wire-format family of a request, fixed once the envelope is parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolVariant {
    JsonRpc,
    Simple,
}

impl ProtocolVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JsonRpc => "json_rpc",
            Self::Simple => "simple",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RpcMethod {
    MessageSend,
    TaskSubscribe,
    Unknown(String),
}

impl RpcMethod {
    fn from_name(name: &str) -> Self {
        match name {
            METHOD_MESSAGE_SEND => Self::MessageSend,
            METHOD_TASK_SUBSCRIBE => Self::TaskSubscribe,
            other => Self::Unknown(other.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JsonRpcCall {
    /// `None` only when the `id` key was missing; an explicit `null` is kept.
    pub id: Option<Value>,
    pub method: RpcMethod,
    pub params: Value,
}

#[derive(Clone, Debug)]
pub enum Envelope {
    JsonRpc(JsonRpcCall),
    Simple(Map<String, Value>),
}

/// A parse failure together with what is known about how to answer it.
#[derive(Debug)]
pub struct Rejection {
    pub variant: ProtocolVariant,
    pub id: Option<Value>,
    pub error: DispatchError,
}

impl Envelope {
    pub fn parse(body: &[u8]) -> Result<Self, Rejection> {
        let reject_parse = |reason: String| Rejection {
            variant: guess_variant_from_raw(body),
            id: None,
            error: DispatchError::Parse(reason),
        };

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(reject_parse("No JSON data provided".to_string()));
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|err| reject_parse(err.to_string()))?;

        let Value::Object(obj) = value else {
            return Err(reject_parse("request body must be a JSON object".to_string()));
        };
        if obj.is_empty() {
            return Err(reject_parse("No JSON data provided".to_string()));
        }

        match obj.get("jsonrpc") {
            None => Ok(Envelope::Simple(obj)),
            Some(Value::String(version)) if version == JSONRPC_VERSION => {
                Self::parse_jsonrpc(obj)
            }
            Some(_) => Err(Rejection {
                variant: ProtocolVariant::Simple,
                id: None,
                error: DispatchError::InvalidRequest("jsonrpc must be '2.0'".to_string()),
            }),
        }
    }

    fn parse_jsonrpc(mut obj: Map<String, Value>) -> Result<Self, Rejection> {
        let id = obj.remove("id");
        let method = match obj.get("method") {
            Some(Value::String(name)) if !name.trim().is_empty() => RpcMethod::from_name(name),
            _ => {
                return Err(Rejection {
                    variant: ProtocolVariant::JsonRpc,
                    id,
                    error: DispatchError::InvalidRequest(
                        "method is required and must be a string".to_string(),
                    ),
                });
            }
        };
        let params = obj.remove("params").unwrap_or(Value::Null);

        Ok(Envelope::JsonRpc(JsonRpcCall { id, method, params }))
    }

    pub fn variant(&self) -> ProtocolVariant {
        match self {
            Envelope::JsonRpc(_) => ProtocolVariant::JsonRpc,
            Envelope::Simple(_) => ProtocolVariant::Simple,
        }
    }

    pub fn request_id(&self) -> Option<&Value> {
        match self {
            Envelope::JsonRpc(call) => call.id.as_ref(),
            Envelope::Simple(obj) => obj.get("id"),
        }
    }

    /// The `message` object that carries parts and metadata, if any.
    pub fn message(&self) -> Option<&Map<String, Value>> {
        match self {
            Envelope::JsonRpc(call) => call.params.get("message").and_then(Value::as_object),
            Envelope::Simple(obj) => obj
                .get("message")
                .and_then(Value::as_object)
                .filter(|message| message.contains_key("parts"))
                .or_else(|| {
                    obj.get("params")
                        .and_then(|params| params.get("message"))
                        .and_then(Value::as_object)
                })
                .or_else(|| obj.get("message").and_then(Value::as_object)),
        }
    }

    /// Caller identity reported by the platform, for logging only.
    pub fn caller_id(&self) -> &str {
        self.metadata_str("telex_user_id").unwrap_or("anonymous")
    }

    /// Optional free-form context forwarded to the generator.
    pub fn context(&self) -> Option<&str> {
        self.metadata_str("context")
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.message()?
            .get("metadata")?
            .get(key)?
            .as_str()
    }
}

/// Best guess at the variant of a body that could not be decoded.
fn guess_variant_from_raw(body: &[u8]) -> ProtocolVariant {
    let text = String::from_utf8_lossy(body);
    if text.contains("\"jsonrpc\"") {
        ProtocolVariant::JsonRpc
    } else {
        ProtocolVariant::Simple
    }
}
