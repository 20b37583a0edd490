//! End-to-end recovery pipeline.
//!
//! Two entry points mirror the two ways text reaches the solver:
//!
//! - [`solve_question`] for a typed question plus diagram labels;
//! - [`solve_candidates`] for pooled recognizer candidates.
//!
//! Both always return a response; failures are folded into its `error` field.

use mathrepair_symbolic::SolveOptions;
use serde::{Deserialize, Serialize};

use crate::core::{
    clean_fallback, dispatch, has_operator, normalize, normalize_angles, post_process,
    preprocess_question, select_best, substitute_labels, validate, AngleUnit, Label, SolveResult,
    SolveValue, ValidationVerdict,
};
use crate::sources::CandidatePool;
use crate::utils::error::{PipelineError, PipelineResult};
use crate::utils::report::{PipelineTrace, Stage};

/// Environment variable read by [`PipelineOptions::from_env`].
pub const ANGLE_UNIT_ENV: &str = "MATHREPAIR_ANGLE_UNIT";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        let defaults = SolveOptions::default();
        Self {
            tolerance: defaults.tolerance,
            max_iterations: defaults.max_iterations,
        }
    }
}

impl From<SolverOptions> for SolveOptions {
    fn from(options: SolverOptions) -> Self {
        SolveOptions {
            tolerance: options.tolerance,
            max_iterations: options.max_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub angle_unit: AngleUnit,
    pub solver: SolverOptions,
}

impl PipelineOptions {
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(value) = std::env::var(ANGLE_UNIT_ENV) {
            match AngleUnit::from_name(&value) {
                Some(unit) => options.angle_unit = unit,
                None => tracing::warn!(value = %value, "ignoring unknown {}", ANGLE_UNIT_ENV),
            }
        }
        options
    }

    #[cfg(feature = "options-file")]
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn radians() -> Self {
        Self {
            angle_unit: AngleUnit::Radians,
            ..Self::default()
        }
    }
}

/// Response for the typed-question path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub result: Option<String>,
    pub steps: Option<String>,
    pub error: Option<String>,
}

impl SolveResponse {
    fn from_outcome(outcome: &PipelineResult<SolveResult>) -> Self {
        match outcome {
            Ok(solved) => Self {
                result: Some(solved.value.to_string()),
                steps: Some(solved.steps.clone()),
                error: None,
            },
            Err(err) => Self {
                result: None,
                steps: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Response for the recognizer-candidate path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcrResponse {
    Solved {
        ocr_output: String,
        postprocessed: String,
        result: Option<String>,
        steps: Option<String>,
        error: Option<String>,
    },
    NoOperator {
        error: String,
        ocr_output: String,
        postprocessed: String,
    },
    /// Fallback recognizer text, returned without solving.
    Text { text: String },
}

/// A response together with the trace of how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    pub response: T,
    pub outcome: Option<SolveResult>,
    pub trace: PipelineTrace,
}

/// Solve a typed question, binding `labels` to its free variables.
pub fn solve_question(question: &str, labels: &[Label], options: &PipelineOptions) -> SolveResponse {
    solve_question_with_report(question, labels, options).response
}

pub fn solve_question_with_report(
    question: &str,
    labels: &[Label],
    options: &PipelineOptions,
) -> Report<SolveResponse> {
    let mut trace = PipelineTrace::new();
    let outcome = run_question(question, labels, options, &mut trace);
    match &outcome {
        Ok(solved) => tracing::info!(result = %solved.value, "solved"),
        Err(err) => {
            tracing::info!(error = %err, "pipeline stopped");
            trace.error = Some(err.kind().to_string());
        }
    }
    Report {
        response: SolveResponse::from_outcome(&outcome),
        outcome: outcome.ok(),
        trace,
    }
}

fn run_question(
    question: &str,
    labels: &[Label],
    options: &PipelineOptions,
    trace: &mut PipelineTrace,
) -> PipelineResult<SolveResult> {
    if question.trim().is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let text = preprocess_question(question);
    trace.record(Stage::Preprocess, text.as_str());

    let normalized = normalize(&text);
    trace.record(Stage::Normalize, normalized.as_str());

    let (substituted, warnings) = substitute_labels(normalized.as_str(), labels);
    for warning in warnings {
        trace.warn(warning);
    }
    trace.record(Stage::Substitute, substituted.as_str());

    let check = validate(&substituted);
    trace.verdict = Some(ValidationVerdict::from_check(check));
    check.map_err(PipelineError::invalid)?;
    trace.record(Stage::Validate, substituted.as_str());

    let converted = normalize_angles(&substituted, options.angle_unit);
    trace.record(Stage::Angles, converted.as_str());

    let solved = dispatch(&converted, &options.solver.into())?;
    trace.record(Stage::Dispatch, solved.steps.as_str());
    Ok(solved)
}

/// Select among pooled recognizer candidates and solve the winner.
///
/// An empty primary pool falls back to the fallback recognizer's text, which
/// is cleaned and returned as is.
pub fn solve_candidates(pool: &CandidatePool, options: &PipelineOptions) -> OcrResponse {
    solve_candidates_with_report(pool, options).response
}

pub fn solve_candidates_with_report(
    pool: &CandidatePool,
    options: &PipelineOptions,
) -> Report<OcrResponse> {
    let mut trace = PipelineTrace::new();

    let Some(best) = select_best(&pool.primary) else {
        let text = pool
            .fallback
            .as_deref()
            .map(clean_fallback)
            .unwrap_or_default();
        if pool.is_empty() {
            tracing::warn!("candidate pool is empty");
        } else {
            tracing::warn!("no primary candidates, returning fallback text");
        }
        trace.record(Stage::PostProcess, text.as_str());
        return Report {
            response: OcrResponse::Text { text },
            outcome: None,
            trace,
        };
    };
    tracing::debug!(
        candidates = pool.primary.len(),
        source = %best.source_tag,
        "candidate selected"
    );
    trace.record(Stage::Select, best.raw_text.as_str());

    let postprocessed = post_process(&best.raw_text);
    trace.record(Stage::PostProcess, postprocessed.as_str());

    if !has_operator(&postprocessed) {
        let err = PipelineError::no_operator(best.raw_text.as_str(), postprocessed.as_str());
        trace.error = Some(err.kind().to_string());
        return Report {
            response: OcrResponse::NoOperator {
                error: err.to_string(),
                ocr_output: best.raw_text.clone(),
                postprocessed,
            },
            outcome: None,
            trace,
        };
    }

    let solved = solve_question_with_report(&postprocessed, &[], options);
    trace.stages.extend(solved.trace.stages);
    trace.warnings.extend(solved.trace.warnings);
    trace.verdict = solved.trace.verdict;
    trace.error = solved.trace.error;

    let SolveResponse {
        result,
        steps,
        error,
    } = solved.response;
    Report {
        response: OcrResponse::Solved {
            ocr_output: best.raw_text.clone(),
            postprocessed,
            result,
            steps,
            error,
        },
        outcome: solved.outcome,
        trace,
    }
}

/// Human-readable summary of a solve.
pub fn format_solution(result: Option<&SolveResult>) -> String {
    let Some(solved) = result else {
        return "Could not solve the problem.".to_string();
    };
    match &solved.value {
        SolveValue::Solutions(solutions) if solutions.len() == 1 => {
            format!("Solution: {}\n\nSteps:\n{}", solutions[0], solved.steps)
        }
        SolveValue::Solutions(_) => {
            format!("Solutions: {}\n\nSteps:\n{}", solved.value, solved.steps)
        }
        value => format!("Result: {}\n\nSteps:\n{}", value, solved.steps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Candidate;
    use pretty_assertions::assert_eq;

    fn ask(question: &str) -> SolveResponse {
        solve_question(question, &[], &PipelineOptions::default())
    }

    #[test]
    fn empty_question_is_reported() {
        let response = ask("   ");
        assert_eq!(response.error.as_deref(), Some("No question provided"));
        assert_eq!(response.result, None);
    }

    #[test]
    fn trace_records_every_stage() {
        let report = solve_question_with_report("What is 2+2?", &[], &PipelineOptions::default());
        let stages: Vec<_> = report.trace.stages.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::Preprocess,
                Stage::Normalize,
                Stage::Substitute,
                Stage::Validate,
                Stage::Angles,
                Stage::Dispatch
            ]
        );
        assert_eq!(report.trace.output_of(Stage::Preprocess), Some("2+2"));
    }

    #[test]
    fn validation_failure_stops_before_dispatch() {
        let report = solve_question_with_report("2++3", &[], &PipelineOptions::default());
        assert_eq!(
            report.response.error.as_deref(),
            Some("Invalid expression: Consecutive operators")
        );
        assert_eq!(report.trace.output_of(Stage::Dispatch), None);
        assert_eq!(report.trace.error.as_deref(), Some("validation"));
        assert_eq!(
            report.trace.verdict,
            Some(ValidationVerdict {
                ok: false,
                reason: "Consecutive operators".to_string()
            })
        );
    }

    #[test]
    fn passing_verdict_is_recorded() {
        let report = solve_question_with_report("1+1", &[], &PipelineOptions::default());
        assert_eq!(report.trace.verdict.map(|v| v.ok), Some(true));

        let report = solve_question_with_report("", &[], &PipelineOptions::default());
        assert_eq!(report.trace.verdict, None);
    }

    #[test]
    fn radians_option_skips_angle_conversion() {
        let response = solve_question("sin(0)", &[], &PipelineOptions::radians());
        assert_eq!(response.result.as_deref(), Some("0"));
        let report = solve_question_with_report("cos(pi)", &[], &PipelineOptions::radians());
        assert_eq!(report.response.result.as_deref(), Some("-1"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: PipelineOptions =
            serde_json::from_str(r#"{"angle_unit":"radians"}"#).unwrap();
        assert_eq!(options.angle_unit, AngleUnit::Radians);
        assert_eq!(options.solver, SolverOptions::default());
    }

    #[cfg(feature = "options-file")]
    #[test]
    fn options_from_toml() {
        let options = PipelineOptions::from_toml_str(
            "angle_unit = \"radians\"\n[solver]\nmax_iterations = 50\n",
        )
        .unwrap();
        assert_eq!(options.angle_unit, AngleUnit::Radians);
        assert_eq!(options.solver.max_iterations, 50);
    }

    #[test]
    fn fallback_text_is_cleaned_when_no_candidates() {
        let pool = CandidatePool {
            primary: Vec::new(),
            fallback: Some("lO + o".to_string()),
        };
        assert_eq!(
            solve_candidates(&pool, &PipelineOptions::default()),
            OcrResponse::Text {
                text: "10 + 0".to_string()
            }
        );
        let empty = CandidatePool::default();
        assert_eq!(
            solve_candidates(&empty, &PipelineOptions::default()),
            OcrResponse::Text {
                text: String::new()
            }
        );
    }

    #[test]
    fn prose_candidate_has_no_operator() {
        let pool = CandidatePool {
            primary: vec![Candidate::new("hello", "model")],
            fallback: None,
        };
        let response = solve_candidates(&pool, &PipelineOptions::default());
        assert_eq!(
            response,
            OcrResponse::NoOperator {
                error: "No math operator detected in OCR output.".to_string(),
                ocr_output: "hello".to_string(),
                postprocessed: "110".to_string(),
            }
        );
    }

    #[test]
    fn format_solution_shapes() {
        assert_eq!(format_solution(None), "Could not solve the problem.");

        let single = solve_question_with_report("x+5=10", &[], &PipelineOptions::default());
        assert_eq!(
            format_solution(single.outcome.as_ref()),
            "Solution: 5\n\nSteps:\nEquation: x + 5 = 10\nSolution: [5]"
        );

        let pair = solve_question_with_report("x^2=4", &[], &PipelineOptions::default());
        assert!(format_solution(pair.outcome.as_ref()).starts_with("Solutions: [-2, 2]"));

        let value = solve_question_with_report("2+2", &[], &PipelineOptions::default());
        assert!(format_solution(value.outcome.as_ref()).starts_with("Result: 4\n\nSteps:\n"));
    }
}
