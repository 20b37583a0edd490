//! # mathrepair
//!
//! Recover a solvable math expression from noisy handwriting-recognition
//! output and solve it.
//!
//! Text enters either as a typed question plus diagram labels, or as a pool
//! of recognizer candidates. It is cleaned up into canonical ASCII math,
//! labels are bound to free variables, the result is checked for obvious
//! malformation, trig arguments are converted to radians, and the expression
//! or equation is handed to [`mathrepair_symbolic`].
//!
//! ## Example
//!
//! ```
//! use mathrepair::{solve_question, Label, PipelineOptions};
//!
//! let labels = [Label::with_value("a", 3.0), Label::with_value("b", 4.0)];
//! let response = solve_question("a+b=10", &labels, &PipelineOptions::default());
//! assert!(response.steps.unwrap().contains("3+4=10"));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: the individual stages and their character tables
//! - [`pipeline`]: the two entry points that chain the stages
//! - [`sources`]: candidate-producing strategies and pooling
//! - [`utils`]: error taxonomy and stage traces

pub mod core;
pub mod pipeline;
pub mod sources;
pub mod utils;
pub mod wasm;

pub use crate::core::{
    normalize, post_process, select_best, validate, AngleUnit, Candidate, Label, LabelValue,
    NormalizedExpression, SolveKind, SolveResult, SolveValue, ValidationFailure,
};
pub use pipeline::{
    format_solution, solve_candidates, solve_candidates_with_report, solve_question,
    solve_question_with_report, OcrResponse, PipelineOptions, Report, SolveResponse,
    SolverOptions,
};
pub use sources::{gather, CandidatePool, CandidateSource, StaticSource};
pub use utils::{PipelineError, PipelineResult, PipelineTrace, SourceError, Stage};
