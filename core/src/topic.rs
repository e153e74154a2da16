/// Body-part synonyms in canonical order. Used only for reply metadata.
pub const BODY_PART_SYNONYMS: &[&str] = &[
    "arms",
    "arm",
    "biceps",
    "triceps",
    "forearms",
    "legs",
    "leg",
    "thighs",
    "calves",
    "quadriceps",
    "hamstrings",
    "core",
    "abs",
    "abdominal",
    "stomach",
    "obliques",
    "chest",
    "pecs",
    "pectorals",
    "back",
    "lats",
    "traps",
    "shoulders",
    "shoulder",
    "delts",
    "glutes",
    "butt",
    "buttocks",
    "full body",
    "whole body",
];

pub const GENERAL_TOPIC: &str = "general";

/// Case-insensitive substring match against [`BODY_PART_SYNONYMS`].
///
/// When several synonyms occur, the longest one wins and ties go to the
/// earlier list entry, so "forearms" beats "arms" and "legs" beats "leg".
pub fn detect_topic(utterance: &str) -> &'static str {
    let lowered = utterance.to_lowercase();
    BODY_PART_SYNONYMS
        .iter()
        .copied()
        .filter(|synonym| lowered.contains(synonym))
        .fold(None, |best: Option<&'static str>, candidate| match best {
            Some(current) if current.len() >= candidate.len() => Some(current),
            _ => Some(candidate),
        })
        .unwrap_or(GENERAL_TOPIC)
}
