//! Stage-by-stage trace of one pipeline call.

use serde::Serialize;

use crate::core::ValidationVerdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Select,
    PostProcess,
    Preprocess,
    Normalize,
    Substitute,
    Validate,
    Angles,
    Dispatch,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Select => "select",
            Stage::PostProcess => "post-process",
            Stage::Preprocess => "preprocess",
            Stage::Normalize => "normalize",
            Stage::Substitute => "substitute",
            Stage::Validate => "validate",
            Stage::Angles => "angles",
            Stage::Dispatch => "dispatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub output: String,
}

/// A label that was dropped while building the substitution map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelWarning {
    pub label: String,
    pub reason: String,
}

impl LabelWarning {
    pub fn new(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineTrace {
    pub stages: Vec<StageRecord>,
    pub warnings: Vec<LabelWarning>,
    /// Outcome of the structural gate, once it has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ValidationVerdict>,
    /// Kind of the error the call ended with, if any.
    pub error: Option<String>,
}

impl PipelineTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, output: impl Into<String>) {
        let output = output.into();
        tracing::debug!(stage = stage.name(), output = %output, "pipeline stage complete");
        self.stages.push(StageRecord { stage, output });
    }

    pub fn warn(&mut self, warning: LabelWarning) {
        tracing::warn!(label = %warning.label, reason = %warning.reason, "label dropped");
        self.warnings.push(warning);
    }

    /// Output of the last record for `stage`.
    pub fn output_of(&self, stage: Stage) -> Option<&str> {
        self.stages
            .iter()
            .rev()
            .find(|r| r.stage == stage)
            .map(|r| r.output.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_stage_names_in_kebab_case() {
        let mut trace = PipelineTrace::new();
        trace.record(Stage::PostProcess, "12+3");
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["stages"][0]["stage"], "post-process");
        assert_eq!(json["stages"][0]["output"], "12+3");
        assert!(json["error"].is_null());
        assert!(json.get("verdict").is_none());
    }

    #[test]
    fn verdict_serializes_once_set() {
        let mut trace = PipelineTrace::new();
        trace.verdict = Some(ValidationVerdict::from_check(Ok(())));
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["verdict"]["ok"], true);
        assert_eq!(json["verdict"]["reason"], "Valid expression");
    }

    #[test]
    fn output_of_returns_latest_record() {
        let mut trace = PipelineTrace::new();
        trace.record(Stage::Normalize, "first");
        trace.record(Stage::Normalize, "second");
        assert_eq!(trace.output_of(Stage::Normalize), Some("second"));
        assert_eq!(trace.output_of(Stage::Angles), None);
    }
}
