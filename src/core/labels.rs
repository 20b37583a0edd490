//! Binding diagram labels to the free variables of an expression.

use fxhash::FxHashSet;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use super::tables::EXCLUDED_IDENTIFIERS;
use crate::utils::report::LabelWarning;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"\b[a-zA-Z_][a-zA-Z0-9_]*\b").unwrap();
}

/// A measured or user-entered quantity drawn on the diagram.
///
/// Either `{ "text": "a", "value": 3 }` or `{ "text": "a=3" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LabelValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Number(f64),
    Text(String),
}

impl LabelValue {
    fn to_number(&self) -> Option<f64> {
        match self {
            LabelValue::Number(n) => Some(*n),
            LabelValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for LabelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelValue::Number(n) => write!(f, "{}", n),
            LabelValue::Text(s) => f.write_str(s),
        }
    }
}

impl Label {
    pub fn with_value(text: impl Into<String>, value: f64) -> Self {
        Self {
            text: text.into(),
            value: Some(LabelValue::Number(value)),
        }
    }

    /// A `name=value` label.
    pub fn assignment(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: None,
        }
    }

    /// Variable name and raw value this label would bind, if it has the shape
    /// of a binding at all.
    fn binding(&self) -> Option<(String, RawValue<'_>)> {
        if let Some(value) = &self.value {
            return Some((self.text.trim().to_string(), RawValue::Given(value)));
        }
        let (name, value) = self.text.split_once('=')?;
        Some((name.trim().to_string(), RawValue::Written(value.trim())))
    }
}

enum RawValue<'a> {
    Given(&'a LabelValue),
    Written(&'a str),
}

impl RawValue<'_> {
    fn to_number(&self) -> Option<f64> {
        match self {
            RawValue::Given(value) => value.to_number(),
            RawValue::Written(text) => text.parse().ok(),
        }
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Given(value) => value.to_string(),
            RawValue::Written(text) => text.to_string(),
        }
    }
}

/// Variable name to value, in first-definition order; later labels for the
/// same variable overwrite the value.
pub type SubstitutionMap = IndexMap<String, f64>;

/// Identifiers in `expr` that are not function names or constants.
pub fn extract_variables(expr: &str) -> FxHashSet<String> {
    IDENTIFIER
        .find_iter(expr)
        .map(|m| m.as_str())
        .filter(|name| !EXCLUDED_IDENTIFIERS.contains(*name))
        .map(str::to_string)
        .collect()
}

/// Build the substitution map for `expr` from `labels`.
///
/// Labels naming a variable the expression does not use are ignored without
/// comment; labels for a used variable whose value is not a finite number are
/// dropped with a warning.
pub fn build_substitutions(expr: &str, labels: &[Label]) -> (SubstitutionMap, Vec<LabelWarning>) {
    let mut map = SubstitutionMap::new();
    let mut warnings = Vec::new();
    if labels.is_empty() {
        return (map, warnings);
    }

    let variables = extract_variables(expr);
    for label in labels {
        let Some((name, raw)) = label.binding() else {
            continue;
        };
        if !variables.contains(&name) {
            continue;
        }
        match raw.to_number() {
            Some(value) if value.is_finite() => {
                tracing::debug!(variable = %name, value, "label bound");
                map.insert(name, value);
            }
            Some(_) => warnings.push(LabelWarning::new(
                label.text.clone(),
                format!("value for '{}' is not finite: {}", name, raw.describe()),
            )),
            None => warnings.push(LabelWarning::new(
                label.text.clone(),
                format!("invalid value for '{}': {}", name, raw.describe()),
            )),
        }
    }
    (map, warnings)
}

/// Replace every whole-token occurrence of each mapped variable.
pub fn apply_substitutions(expr: &str, map: &SubstitutionMap) -> String {
    let mut out = expr.to_string();
    for (name, value) in map {
        let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
            continue;
        };
        out = pattern
            .replace_all(&out, NoExpand(&value_literal(*value)))
            .into_owned();
    }
    out
}

/// Literal text for a substituted value; negatives are parenthesized so
/// `x-a` with `a=-3` reads `x-(-3)`.
fn value_literal(value: f64) -> String {
    if value < 0.0 {
        format!("({})", value)
    } else {
        format!("{}", value)
    }
}

/// Resolve `labels` against `expr` in one step.
pub fn substitute_labels(expr: &str, labels: &[Label]) -> (String, Vec<LabelWarning>) {
    let (map, warnings) = build_substitutions(expr, labels);
    (apply_substitutions(expr, &map), warnings)
}
