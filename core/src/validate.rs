use crate::error::InvalidUtterance;

pub const MAX_UTTERANCE_CHARS: usize = 500;

/// Reject absent, blank, or oversized utterances. Length is counted in
/// characters on the untrimmed input.
pub fn validate_utterance(utterance: Option<&str>) -> Result<&str, InvalidUtterance> {
    let Some(text) = utterance.filter(|text| !text.trim().is_empty()) else {
        return Err(InvalidUtterance::MissingBodyPart);
    };

    let length = text.chars().count();
    if length > MAX_UTTERANCE_CHARS {
        return Err(InvalidUtterance::TooLong {
            length,
            limit: MAX_UTTERANCE_CHARS,
        });
    }

    Ok(text)
}
