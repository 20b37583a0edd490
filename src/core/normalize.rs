//! Text repair: turning recognizer artifacts into canonical expression text.
//!
//! Three cleanups live here, one per kind of input:
//!
//! - [`normalize`] for questions (typed or post-processed), keeping function
//!   names intact;
//! - [`clean_recognizer_output`] for raw handwriting-model output;
//! - [`post_process`] and [`clean_fallback`] for the selected candidate and the
//!   fallback recognizer respectively.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::tables::{
    apply_table, is_canonical, FALLBACK_TABLE, OPERATOR_CHARS, POST_PROCESS_ALPHABET,
    POST_PROCESS_TABLE, PROTECTED_WORDS, RECOGNIZER_TABLE, REPAIR_TABLE,
};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref LETTER_RUN: Regex = Regex::new(r"[A-Za-z]+").unwrap();
    static ref DIGIT_THEN_OP: Regex = Regex::new(r"(\d+)([+\-*/^=])").unwrap();
    static ref OP_THEN_DIGIT: Regex = Regex::new(r"([+\-*/^=])(\d+)").unwrap();
    static ref DOT_BETWEEN_DIGITS: Regex = Regex::new(r"(\d)\s*\.\s*(\d)").unwrap();
    static ref COMMA_BETWEEN_DIGITS: Regex = Regex::new(r"(\d)\s*,\s*(\d)").unwrap();
    static ref COLON_BETWEEN_DIGITS: Regex = Regex::new(r"(\d)\s*:\s*(\d)").unwrap();
    static ref NON_RECOGNIZER_CHAR: Regex = Regex::new(r"[^0-9a-z+\-*/^=(). ]").unwrap();
    static ref ALL_DIGITS: Regex = Regex::new(r"^\d+$").unwrap();
}

/// Expression text restricted to the canonical alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedExpression {
    pub text: String,
}

impl NormalizedExpression {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for NormalizedExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Repair `raw` into canonical expression text.
///
/// Normalizing already-normalized text returns it unchanged.
pub fn normalize(raw: &str) -> NormalizedExpression {
    let collapsed = collapse_whitespace(raw);
    let stripped = collapsed.trim_end_matches('.');
    let repaired = repair_outside_protected(stripped);

    let canonical: String = repaired.chars().filter(|c| is_canonical(*c)).collect();
    let canonical = collapse_whitespace(&canonical);
    let canonical = trim_trailing_dots(&canonical);

    NormalizedExpression {
        text: space_digits_and_operators(&canonical),
    }
}

/// Cleanup for raw handwriting-model output.
///
/// More aggressive than [`normalize`]: everything is lower-cased and `t`, `s`
/// are taken as `+`, `5`, which would break function names, so the result is
/// only ever used as a selection candidate.
pub fn clean_recognizer_output(raw: &str) -> String {
    let text = raw.to_lowercase();
    let text = apply_table(&RECOGNIZER_TABLE, text.trim());
    let text = text.trim_end_matches('.');
    let mut text = punctuation_to_minus(text);

    if !has_operator(&text) {
        if let Some(joined) = join_two_numbers(&text) {
            text = joined;
        }
    }

    let text = NON_RECOGNIZER_CHAR.replace_all(&text, "");
    collapse_whitespace(&text)
}

/// Read `.`, `,` and `:` between digits as minus, one mark at a time.
///
/// Each pass sees the output of the previous one, so a digit shared by two
/// different marks (`1.2,3`) is rewritten on both sides.
fn punctuation_to_minus(text: &str) -> String {
    let text = DOT_BETWEEN_DIGITS.replace_all(text, "$1-$2");
    let text = COMMA_BETWEEN_DIGITS.replace_all(&text, "$1-$2");
    COLON_BETWEEN_DIGITS.replace_all(&text, "$1-$2").into_owned()
}

/// Post-process the selected candidate: fix glyph confusions and keep only
/// digits, `x`, operators, parentheses, dots and spaces.
pub fn post_process(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let replaced = apply_table(&POST_PROCESS_TABLE, text);
    let collapsed = collapse_whitespace(&replaced);
    let kept: String = collapsed
        .chars()
        .filter(|c| POST_PROCESS_ALPHABET.contains(*c))
        .collect();
    kept.trim().to_string()
}

/// Cleanup for text produced by the fallback recognizer.
pub fn clean_fallback(text: &str) -> String {
    post_process(&apply_table(&FALLBACK_TABLE, text))
}

/// True when `text` contains any of `+ - * / ^ =`.
pub fn has_operator(text: &str) -> bool {
    text.chars().any(|c| OPERATOR_CHARS.contains(c))
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn trim_trailing_dots(text: &str) -> String {
    let mut out = text;
    loop {
        let next = out.trim_end_matches('.').trim_end();
        if next.len() == out.len() {
            return out.to_string();
        }
        out = next;
    }
}

/// Apply [`REPAIR_TABLE`] everywhere except inside whole protected words.
fn repair_outside_protected(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for run in LETTER_RUN.find_iter(text) {
        out.push_str(&apply_table(&REPAIR_TABLE, &text[last..run.start()]));
        if PROTECTED_WORDS.contains(run.as_str()) {
            out.push_str(run.as_str());
        } else {
            out.push_str(&apply_table(&REPAIR_TABLE, run.as_str()));
        }
        last = run.end();
    }
    out.push_str(&apply_table(&REPAIR_TABLE, &text[last..]));
    out
}

fn space_digits_and_operators(text: &str) -> String {
    let spaced = DIGIT_THEN_OP.replace_all(text, "$1 $2");
    OP_THEN_DIGIT.replace_all(&spaced, "$1 $2").into_owned()
}

/// `"12 3"` becomes `"12+3"`; anything else is left alone.
fn join_two_numbers(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [a, b] if ALL_DIGITS.is_match(a) && ALL_DIGITS.is_match(b) => Some(format!("{a}+{b}")),
        _ => None,
    }
}
