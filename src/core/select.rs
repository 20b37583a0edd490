//! Picking the most math-like candidate.

use serde::{Deserialize, Serialize};

use super::tables::SCORE_CHARS;

/// One raw text guess from a recognition pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub raw_text: String,
    #[serde(default)]
    pub source_tag: String,
}

impl Candidate {
    pub fn new(raw_text: impl Into<String>, source_tag: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            source_tag: source_tag.into(),
        }
    }
}

/// Operator-ish characters plus length, in characters.
pub fn score(text: &str) -> usize {
    let operators = text.chars().filter(|c| SCORE_CHARS.contains(*c)).count();
    operators + text.chars().count()
}

/// Highest-scoring candidate; ties go to the earliest.
pub fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best: Option<(&Candidate, usize)> = None;
    for candidate in candidates {
        let s = score(&candidate.raw_text);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((candidate, s));
        }
    }
    best.map(|(candidate, _)| candidate)
}
