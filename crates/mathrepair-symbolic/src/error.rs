//! Error types for parsing, evaluation and solving.

/// Grammar errors raised by [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unexpected token '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unknown function '{name}' at offset {offset}")]
    UnknownFunction { name: String, offset: usize },
    #[error("function '{name}' must be followed by '('")]
    MissingCall { name: String },
    #[error("unmatched '(' at offset {offset}")]
    UnmatchedParen { offset: usize },
    #[error("invalid number literal '{literal}'")]
    InvalidNumber { literal: String },
    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl ParseError {
    pub fn unexpected(found: impl Into<String>, offset: usize) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            offset,
        }
    }
}

/// Numeric evaluation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("symbol '{0}' has no value")]
    UnboundSymbol(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("math domain error: {func}({value})")]
    Domain { func: &'static str, value: f64 },
    #[error("result is undefined")]
    Undefined,
}

impl EvalError {
    pub fn domain(func: &'static str, value: f64) -> Self {
        EvalError::Domain { func, value }
    }
}

/// Failures while solving an equation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("cannot solve: {0}")]
    Unsupported(String),
    #[error("numeric search for '{symbol}' did not converge")]
    NoConvergence { symbol: String },
}

impl SolveError {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        SolveError::Unsupported(reason.into())
    }
}
