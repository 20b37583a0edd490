//! WASM bindings for mathrepair
//!
//! This module exposes the two pipeline entry points to JavaScript. Inputs
//! arrive as JSON strings so the browser side can pass recognizer output and
//! diagram labels straight through.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::core::{clean_recognizer_output, normalize, AngleUnit, Label};
#[cfg(feature = "wasm")]
use crate::pipeline::{
    solve_candidates_with_report, solve_question_with_report, PipelineOptions, SolverOptions,
};
#[cfg(feature = "wasm")]
use crate::sources::CandidatePool;
#[cfg(feature = "wasm")]
use crate::utils::report::PipelineTrace;

/// Solve options (exposed to WASM)
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Default)]
pub struct WasmSolveOptions {
    /// Trig arguments are already in radians
    #[serde(default)]
    pub radians: bool,
    /// Include the stage trace in the result
    #[serde(default)]
    pub trace: bool,
    #[serde(default)]
    pub solver: SolverOptions,
}

#[cfg(feature = "wasm")]
impl WasmSolveOptions {
    fn pipeline(&self) -> PipelineOptions {
        PipelineOptions {
            angle_unit: if self.radians {
                AngleUnit::Radians
            } else {
                AngleUnit::Degrees
            },
            solver: self.solver,
        }
    }
}

/// Response wrapper carrying the optional trace.
#[cfg(feature = "wasm")]
#[derive(Serialize)]
struct WasmResult<T: Serialize> {
    #[serde(flatten)]
    response: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<PipelineTrace>,
}

#[cfg(feature = "wasm")]
#[derive(Serialize)]
struct InputError {
    error: String,
}

/// Safely serialize a value to JsValue, returning an error object on failure.
#[cfg(feature = "wasm")]
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = InputError {
            error: format!("Serialization error: {}", e),
        };
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

#[cfg(feature = "wasm")]
fn input_error(what: &str, err: serde_json::Error) -> JsValue {
    to_js_value(&InputError {
        error: format!("Invalid {}: {}", what, err),
    })
}

#[cfg(feature = "wasm")]
fn parse_options(options_json: Option<String>) -> Result<WasmSolveOptions, JsValue> {
    match options_json.as_deref().map(str::trim) {
        None | Some("") => Ok(WasmSolveOptions::default()),
        Some(json) => serde_json::from_str(json).map_err(|e| input_error("options", e)),
    }
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Solve a typed question
///
/// # Arguments
/// * `question` - The question text, e.g. `"What is 2+2?"`
/// * `labels_json` - JSON array of labels, e.g. `[{"text":"a","value":3}]`
/// * `options_json` - Optional JSON options
///
/// # Returns
/// `{ result, steps, error }`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "solveQuestion")]
pub fn solve_question(
    question: &str,
    labels_json: Option<String>,
    options_json: Option<String>,
) -> JsValue {
    let options = match parse_options(options_json) {
        Ok(options) => options,
        Err(err) => return err,
    };
    let labels: Vec<Label> = match labels_json.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(json) => match serde_json::from_str(json) {
            Ok(labels) => labels,
            Err(e) => return input_error("labels", e),
        },
    };

    let report = solve_question_with_report(question, &labels, &options.pipeline());
    to_js_value(&WasmResult {
        response: report.response,
        trace: options.trace.then_some(report.trace),
    })
}

/// Select among recognizer candidates and solve the winner
///
/// # Arguments
/// * `pool_json` - `{ "primary": [{ "raw_text": "..", "source_tag": ".." }], "fallback": ".." }`
/// * `options_json` - Optional JSON options
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "solveCandidates")]
pub fn solve_candidates(pool_json: &str, options_json: Option<String>) -> JsValue {
    let options = match parse_options(options_json) {
        Ok(options) => options,
        Err(err) => return err,
    };
    let pool: CandidatePool = match serde_json::from_str(pool_json) {
        Ok(pool) => pool,
        Err(e) => return input_error("candidates", e),
    };

    let report = solve_candidates_with_report(&pool, &options.pipeline());
    to_js_value(&WasmResult {
        response: report.response,
        trace: options.trace.then_some(report.trace),
    })
}

/// Normalize text into canonical math
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "normalizeText")]
pub fn normalize_text(input: &str, recognizer: bool) -> String {
    if recognizer {
        clean_recognizer_output(input)
    } else {
        normalize(input).to_string()
    }
}
