//! Structural gate run before any parse attempt.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref DIGIT: Regex = Regex::new(r"\d").unwrap();
    static ref FUNCTION_NAME: Regex = Regex::new(r"(?i)\b(sin|cos|tan|sqrt|log|ln|exp)\b").unwrap();
    static ref OPERATOR_RUN: Regex = Regex::new(r"[+\-*/^]{2,}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ValidationFailure {
    #[error("Empty expression")]
    Empty,
    /// Only bare letters and operators: labels are missing.
    #[error("No numbers or functions found")]
    NoNumbersOrFunctions,
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("Consecutive operators")]
    ConsecutiveOperators,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub ok: bool,
    pub reason: String,
}

impl ValidationVerdict {
    pub fn from_check(check: Result<(), ValidationFailure>) -> Self {
        match check {
            Ok(()) => Self {
                ok: true,
                reason: "Valid expression".to_string(),
            },
            Err(failure) => Self {
                ok: false,
                reason: failure.to_string(),
            },
        }
    }
}

/// Check `expr` for defects that make parsing pointless.
pub fn validate(expr: &str) -> Result<(), ValidationFailure> {
    if expr.is_empty() {
        return Err(ValidationFailure::Empty);
    }
    if !DIGIT.is_match(expr) && !FUNCTION_NAME.is_match(expr) {
        return Err(ValidationFailure::NoNumbersOrFunctions);
    }
    if expr.matches('(').count() != expr.matches(')').count() {
        return Err(ValidationFailure::UnbalancedParentheses);
    }
    if OPERATOR_RUN.is_match(expr) {
        return Err(ValidationFailure::ConsecutiveOperators);
    }
    Ok(())
}
