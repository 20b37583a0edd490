//! Strip natural-language scaffolding from a typed question.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_PHRASE: Regex =
        Regex::new(r"(?i)^\s*(?:what\s+is|calculate|solve|find)\s+").unwrap();
    static ref TRAILING_EQUALS_QUESTION: Regex = Regex::new(r"=\s*\?$").unwrap();
    static ref TRAILING_QUESTION: Regex = Regex::new(r"\?$").unwrap();
}

/// `"What is 2+2?"` becomes `"2+2"`.
///
/// Only a single leading phrase is removed; the words are left alone anywhere
/// else in the question.
pub fn preprocess_question(question: &str) -> String {
    let text = LEADING_PHRASE.replace(question, "");
    let text = TRAILING_EQUALS_QUESTION.replace(&text, "");
    let text = TRAILING_QUESTION.replace(&text, "");
    text.trim().to_string()
}
