//! Equation/expression dispatch onto the symbolic solver.

use std::fmt;

use mathrepair_symbolic::{
    evaluate, format_number, format_solutions, parse, solve, Equation, EvalError, Expr, Solution,
    SolveOptions,
};
use serde::Serialize;

use crate::utils::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveKind {
    Equation,
    Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveValue {
    /// Complete solution set of an equation, possibly empty.
    Solutions(Vec<Solution>),
    Number(f64),
    /// An expression that still mentions unbound symbols.
    Symbolic(String),
}

impl fmt::Display for SolveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveValue::Solutions(solutions) => f.write_str(&format_solutions(solutions)),
            SolveValue::Number(value) => f.write_str(&format_number(*value)),
            SolveValue::Symbolic(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub kind: SolveKind,
    pub value: SolveValue,
    pub steps: String,
}

/// Parse `text` and solve or evaluate it.
///
/// Any `=` makes `text` an equation, split at the first one.
pub fn dispatch(text: &str, options: &SolveOptions) -> PipelineResult<SolveResult> {
    match text.split_once('=') {
        Some((lhs, rhs)) => solve_equation(lhs.trim(), rhs.trim(), options),
        None => evaluate_expression(text.trim()),
    }
}

fn parse_side(text: &str) -> PipelineResult<Expr> {
    parse(text).map_err(|err| PipelineError::parse(text, err))
}

fn solve_equation(lhs: &str, rhs: &str, options: &SolveOptions) -> PipelineResult<SolveResult> {
    let equation = Equation::new(parse_side(lhs)?, parse_side(rhs)?);
    tracing::debug!(equation = %equation, "parsed equation");

    let solutions = solve(&equation, options).map_err(PipelineError::solve)?;

    let mut steps = format!("Equation: {}\n", equation);
    if equation.free_symbols().is_empty() {
        if let Some(holds) = equation.check() {
            let compact: String = equation.to_string().split_whitespace().collect();
            steps.push_str(&format!("Check: {} is {}\n", compact, holds));
        }
    }
    steps.push_str(&format!("Solution: {}", format_solutions(&solutions)));

    Ok(SolveResult {
        kind: SolveKind::Equation,
        value: SolveValue::Solutions(solutions),
        steps,
    })
}

fn evaluate_expression(text: &str) -> PipelineResult<SolveResult> {
    let expr = parse_side(text)?;
    tracing::debug!(expression = %expr, "parsed expression");

    let value = match evaluate(&expr) {
        Ok(value) => SolveValue::Number(value),
        Err(EvalError::UnboundSymbol(_)) => SolveValue::Symbolic(expr.to_string()),
        Err(err) => return Err(PipelineError::solve(err)),
    };
    let steps = format!("Expression: {}\nValue: {}", expr, value);

    Ok(SolveResult {
        kind: SolveKind::Expression,
        value,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(text: &str) -> PipelineResult<SolveResult> {
        dispatch(text, &SolveOptions::default())
    }

    #[test]
    fn expression_mode_evaluates() {
        let result = run("2 + 2").unwrap();
        assert_eq!(result.kind, SolveKind::Expression);
        assert_eq!(result.value, SolveValue::Number(4.0));
        assert_eq!(result.steps, "Expression: 2 + 2\nValue: 4");
    }

    #[test]
    fn expression_with_unbound_symbol_falls_back_to_text() {
        let result = run("2x + 1").unwrap();
        assert_eq!(result.value, SolveValue::Symbolic("2 * x + 1".to_string()));
    }

    #[test]
    fn equation_mode_solves() {
        let result = run("x + 5 = 10").unwrap();
        assert_eq!(result.kind, SolveKind::Equation);
        assert_eq!(result.value.to_string(), "[5]");
        assert_eq!(result.steps, "Equation: x + 5 = 10\nSolution: [5]");
    }

    #[test]
    fn closed_equation_reports_check() {
        let result = run("3+4=10").unwrap();
        assert_eq!(result.value, SolveValue::Solutions(Vec::new()));
        assert!(result.steps.contains("Check: 3+4=10 is false"), "{}", result.steps);
    }

    #[test]
    fn parse_errors_carry_text() {
        let err = run("f(2) + 1").unwrap_err();
        match err {
            PipelineError::Parse { text, .. } => assert_eq!(text, "f(2) + 1"),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(matches!(run("1 = 2 = 3"), Err(PipelineError::Parse { .. })));
    }

    #[test]
    fn numeric_failures_are_solve_errors() {
        assert_eq!(
            run("1/0").unwrap_err(),
            PipelineError::solve("division by zero")
        );
    }
}
