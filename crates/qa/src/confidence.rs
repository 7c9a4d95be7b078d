use rptqa_core::ReportMetadata;

use crate::sources::attribute_sources;

/// Baseline score for a non-empty, non-hedged answer.
pub const BASE_SCORE: f64 = 0.5;
/// Bonus per distinct metadata name found verbatim in the answer.
pub const NAME_MATCH_BONUS: f64 = 0.1;
/// The name-match bonus saturates here (diminishing returns past 3 names).
pub const NAME_MATCH_BONUS_CAP: f64 = 0.3;
/// A hedged answer never scores above this, regardless of name matches.
pub const HEDGED_SCORE_CEILING: f64 = 0.3;
/// Penalty for answers shorter than `MIN_ANSWER_CHARS` after trimming.
pub const SHORT_ANSWER_PENALTY: f64 = 0.2;
pub const MIN_ANSWER_CHARS: usize = 20;
/// Scores are clamped to [SCORE_FLOOR, 1.0]; an empty answer sits at the floor.
pub const SCORE_FLOOR: f64 = 0.1;

const HIGH_BAND: f64 = 0.75;
const MEDIUM_BAND: f64 = 0.45;

/// Phrases that signal the model is unsure of its own answer. Matching any of
/// these clamps the score into the low band.
const HEDGE_PHRASES: [&str; 11] = [
    "i don't know",
    "i do not know",
    "not sure",
    "unclear",
    "cannot determine",
    "cannot be answered",
    "not clear from the available information",
    "might be",
    "possibly",
    "it appears",
    "seems like",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Confidence {
    pub score: f64,
    pub reasoning: String,
}

/// Heuristic confidence for a model answer. Pure and deterministic: the score
/// depends only on the answer text and the set of metadata names, not on
/// match positions.
pub fn estimate_confidence(answer: &str, metadata: &ReportMetadata) -> Confidence {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Confidence {
            score: SCORE_FLOOR,
            reasoning: "low: empty answer".to_string(),
        };
    }

    let matches = attribute_sources(trimmed, metadata).len();
    let bonus = (matches as f64 * NAME_MATCH_BONUS).min(NAME_MATCH_BONUS_CAP);
    let mut score = BASE_SCORE + bonus;

    if trimmed.chars().count() < MIN_ANSWER_CHARS {
        score -= SHORT_ANSWER_PENALTY;
    }

    let lower = trimmed.to_lowercase();
    let hedged = HEDGE_PHRASES.iter().any(|phrase| lower.contains(phrase));
    if hedged {
        // min() keeps the score monotonic in `matches` while forcing the
        // low band whenever hedging language is present.
        score = score.min(HEDGED_SCORE_CEILING);
    }

    let score = score.clamp(SCORE_FLOOR, 1.0);
    let band = if score >= HIGH_BAND {
        "high"
    } else if score >= MEDIUM_BAND {
        "medium"
    } else {
        "low"
    };
    let reasoning = if hedged {
        format!("{band}: hedging language detected")
    } else {
        format!("{band}: {matches} metadata name(s) referenced")
    };
    Confidence { score, reasoning }
}
