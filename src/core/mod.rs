//! Pipeline stages
//!
//! Each stage is a pure function of its input and the fixed tables in
//! [`tables`]; the [`crate::pipeline`] module chains them.

pub mod angles;
pub mod dispatch;
pub mod labels;
pub mod normalize;
pub mod question;
pub mod select;
pub mod tables;
pub mod validate;

pub use angles::{degrees_to_radians, normalize_angles, AngleUnit};
pub use dispatch::{dispatch, SolveKind, SolveResult, SolveValue};
pub use labels::{
    apply_substitutions, build_substitutions, extract_variables, substitute_labels, Label,
    LabelValue, SubstitutionMap,
};
pub use normalize::{
    clean_fallback, clean_recognizer_output, has_operator, normalize, post_process,
    NormalizedExpression,
};
pub use question::preprocess_question;
pub use select::{score, select_best, Candidate};
pub use validate::{validate, ValidationFailure, ValidationVerdict};
