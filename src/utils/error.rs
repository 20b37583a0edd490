//! Error handling for the recovery pipeline
//!
//! Every failure a pipeline call can meet is one of the [`PipelineError`]
//! variants. Entry points fold them into the caller-facing response shapes,
//! so none of these ever cross the public boundary as an `Err`.

use crate::core::validate::ValidationFailure;

/// Pipeline error taxonomy
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// No question or candidate text at all
    #[error("No question provided")]
    EmptyInput,
    /// Text survived post-processing but carries no math operator
    #[error("No math operator detected in OCR output.")]
    NoOperator {
        ocr_output: String,
        postprocessed: String,
    },
    /// Structural defect found before parsing
    #[error("Invalid expression: {0}")]
    Validation(ValidationFailure),
    /// The grammar rejected the validated text
    #[error("Parsing error: {message} in '{text}'")]
    Parse { text: String, message: String },
    /// Anything else raised while solving or evaluating
    #[error("Unexpected error: {message}")]
    Solve { message: String },
}

/// Result type for pipeline stages
pub type PipelineResult<T> = Result<T, PipelineError>;

// Convenience constructors for errors
impl PipelineError {
    pub fn parse(text: impl Into<String>, message: impl ToString) -> Self {
        PipelineError::Parse {
            text: text.into(),
            message: message.to_string(),
        }
    }

    pub fn solve(message: impl ToString) -> Self {
        PipelineError::Solve {
            message: message.to_string(),
        }
    }

    pub fn invalid(failure: ValidationFailure) -> Self {
        PipelineError::Validation(failure)
    }

    pub fn no_operator(ocr_output: impl Into<String>, postprocessed: impl Into<String>) -> Self {
        PipelineError::NoOperator {
            ocr_output: ocr_output.into(),
            postprocessed: postprocessed.into(),
        }
    }

    /// Short machine-readable name, used in trace logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::EmptyInput => "empty-input",
            PipelineError::NoOperator { .. } => "no-operator",
            PipelineError::Validation(_) => "validation",
            PipelineError::Parse { .. } => "parse",
            PipelineError::Solve { .. } => "solve",
        }
    }
}

/// A candidate-producing strategy could not run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("candidate source '{tag}' failed: {message}")]
pub struct SourceError {
    pub tag: String,
    pub message: String,
}

impl SourceError {
    pub fn new(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn caller_facing_messages() {
        assert_eq!(PipelineError::EmptyInput.to_string(), "No question provided");
        assert_eq!(
            PipelineError::no_operator("abc", "").to_string(),
            "No math operator detected in OCR output."
        );
        assert_eq!(
            PipelineError::invalid(ValidationFailure::ConsecutiveOperators).to_string(),
            "Invalid expression: Consecutive operators"
        );
        assert_eq!(
            PipelineError::solve("division by zero").to_string(),
            "Unexpected error: division by zero"
        );
    }

    #[test]
    fn parse_error_carries_offending_text() {
        let err = PipelineError::parse("f(2)", "unknown function 'f' at offset 0");
        assert_eq!(
            err.to_string(),
            "Parsing error: unknown function 'f' at offset 0 in 'f(2)'"
        );
        assert_eq!(err.kind(), "parse");
    }
}
