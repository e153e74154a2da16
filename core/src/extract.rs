//! Locate the most recent user-authored text in an envelope.
//!
//! Parts are scanned newest-first. A `text` part wins as soon as it yields
//! non-empty text; a `data` part is searched the same way (newest item first)
//! before the scan moves on to older parts. Structural surprises never fail,
//! they simply yield nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::envelope::Envelope;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid html tag regex"));

/// Canonical utterance for an envelope, or `None` if it carries no usable text.
pub fn extract_utterance(envelope: &Envelope) -> Option<String> {
    let message = envelope.message();
    match message.and_then(|m| m.get("parts")) {
        Some(parts) => extract_from_parts(parts),
        None => hunt_text(envelope),
    }
}

/// Reverse scan of an ordered `parts` sequence.
pub fn extract_from_parts(parts: &Value) -> Option<String> {
    let parts = parts.as_array()?;
    parts.iter().rev().find_map(|part| match part_kind(part) {
        Some("text") => text_of(part),
        Some("data") => part
            .get("data")
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .rev()
                    .filter(|item| part_kind(item) == Some("text"))
                    .find_map(text_of)
            }),
        _ => None,
    })
}

/// Trim, drop `<...>` tags (including `<code>` wrappers), trim again.
pub fn clean_text(raw: &str) -> String {
    TAG_RE.replace_all(raw.trim(), "").trim().to_string()
}

fn part_kind(part: &Value) -> Option<&str> {
    part.get("kind")
        .or_else(|| part.get("type"))
        .and_then(Value::as_str)
}

fn text_of(part: &Value) -> Option<String> {
    let cleaned = clean_text(part.get("text")?.as_str()?);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Last-resort lookup for envelopes that carry no `parts` sequence at all.
fn hunt_text(envelope: &Envelope) -> Option<String> {
    let candidates = match envelope {
        Envelope::JsonRpc(call) => {
            let message = call.params.get("message");
            vec![
                message.and_then(Value::as_str),
                message
                    .and_then(|message| message.get("text"))
                    .and_then(Value::as_str),
            ]
        }
        Envelope::Simple(obj) => vec![
            obj.get("message").and_then(Value::as_str),
            obj.get("message")
                .and_then(|message| message.get("text"))
                .and_then(Value::as_str),
            obj.get("text").and_then(Value::as_str),
        ],
    };
    candidates
        .into_iter()
        .flatten()
        .map(clean_text)
        .find(|text| !text.is_empty())
}
