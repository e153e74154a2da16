use serde_json::{Value, json};
use uuid::Uuid;

use crate::util::api_request;

const A2A_PATH: &str = "/a2a/agent/exerciseAgent";

/// JSON-RPC `message/send` call carrying a single text part.
pub fn jsonrpc_envelope(text: &str, id: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "message/send",
        "params": {
            "message": {
                "kind": "message",
                "role": "user",
                "messageId": Uuid::now_v7().to_string(),
                "parts": [{ "kind": "text", "text": text }]
            }
        }
    })
}

/// Legacy envelope without the JSON-RPC wrapper.
pub fn simple_envelope(text: &str) -> Value {
    json!({
        "message": {
            "role": "user",
            "parts": [{ "kind": "text", "text": text }]
        }
    })
}

pub async fn run(base_url: &str, text: &str, simple: bool, id: Option<&str>, raw: bool) -> i32 {
    let body = if simple {
        simple_envelope(text)
    } else {
        let id = id
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        jsonrpc_envelope(text, &id)
    };
    api_request(base_url, reqwest::Method::POST, A2A_PATH, Some(&body), raw).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonrpc_envelope_carries_id_and_text() {
        let envelope = jsonrpc_envelope("legs please", "req-1");
        assert_eq!(envelope["jsonrpc"], json!("2.0"));
        assert_eq!(envelope["id"], json!("req-1"));
        assert_eq!(envelope["method"], json!("message/send"));
        assert_eq!(
            envelope["params"]["message"]["parts"],
            json!([{ "kind": "text", "text": "legs please" }])
        );
        assert!(envelope["params"]["message"]["messageId"].is_string());
    }

    #[test]
    fn simple_envelope_has_no_rpc_fields() {
        let envelope = simple_envelope("arms");
        assert!(envelope.get("jsonrpc").is_none());
        assert!(envelope.get("method").is_none());
        assert_eq!(envelope["message"]["parts"][0]["text"], json!("arms"));
    }
}
