//! Equation solving.
//!
//! Strategies run in order, first match wins:
//!
//! 1. no unknowns: nothing to solve, the equation is only checked;
//! 2. one unknown, rational in it: polynomial roots of the numerator;
//! 3. an unknown occurring once: symbolic isolation;
//! 4. one unknown: damped Newton from a seed grid.

use std::fmt;

use num_complex::Complex64;

use crate::ast::Expr;
use crate::error::SolveError;
use crate::eval::evaluate;
use crate::format::format_number;
use crate::isolate::isolate;
use crate::newton;
use crate::poly::{roots, to_rational, Rational};

const CHECK_TOLERANCE: f64 = 1e-9;
const VERIFY_TOLERANCE: f64 = 1e-7;
const IMAG_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    pub fn free_symbols(&self) -> std::collections::BTreeSet<String> {
        let mut symbols = self.lhs.free_symbols();
        symbols.extend(self.rhs.free_symbols());
        symbols
    }

    pub fn occurrences(&self, symbol: &str) -> usize {
        self.lhs.occurrences(symbol) + self.rhs.occurrences(symbol)
    }

    /// Truth of a closed equation, `None` if either side has unknowns or
    /// fails to evaluate.
    pub fn check(&self) -> Option<bool> {
        let l = evaluate(&self.lhs).ok()?;
        let r = evaluate(&self.rhs).ok()?;
        Some(approx_eq(l, r, CHECK_TOLERANCE))
    }

    fn residual(&self) -> Expr {
        Expr::sub(self.lhs.clone(), self.rhs.clone())
    }

    fn holds_at(&self, symbol: &str, value: f64) -> bool {
        let at = Expr::number(value);
        let l = evaluate(&self.lhs.substitute(symbol, &at));
        let r = evaluate(&self.rhs.substitute(symbol, &at));
        match (l, r) {
            (Ok(l), Ok(r)) => approx_eq(l, r, VERIFY_TOLERANCE),
            _ => false,
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    Real(f64),
    Complex(Complex64),
    /// `symbol = value` where `value` still mentions other unknowns.
    Assignment { symbol: String, value: Expr },
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solution::Real(value) => f.write_str(&format_number(*value)),
            Solution::Complex(z) => f.write_str(&format_complex(*z)),
            Solution::Assignment { symbol, value } => write!(f, "{{{}: {}}}", symbol, value),
        }
    }
}

fn format_complex(z: Complex64) -> String {
    let im = z.im.abs();
    let imag = if format_number(im) == "1" {
        "I".to_string()
    } else {
        format!("{}*I", format_number(im))
    };
    if format_number(z.re) == "0" {
        return if z.im < 0.0 { format!("-{}", imag) } else { imag };
    }
    let sign = if z.im < 0.0 { '-' } else { '+' };
    format!("{} {} {}", format_number(z.re), sign, imag)
}

/// `[a, b, ...]`, the way solution lists are shown in step logs.
pub fn format_solutions(solutions: &[Solution]) -> String {
    let items: Vec<String> = solutions.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    /// Residual below which a numeric root counts as converged.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

pub fn solve(equation: &Equation, options: &SolveOptions) -> Result<Vec<Solution>, SolveError> {
    let symbols: Vec<String> = equation.free_symbols().into_iter().collect();
    match symbols.as_slice() {
        [] => Ok(Vec::new()),
        [symbol] => solve_single(equation, symbol, options),
        _ => solve_several(equation, &symbols),
    }
}

fn solve_single(
    equation: &Equation,
    symbol: &str,
    options: &SolveOptions,
) -> Result<Vec<Solution>, SolveError> {
    if let Some(rational) = to_rational(&equation.residual(), symbol) {
        return polynomial_solutions(&rational, symbol, options);
    }

    if equation.occurrences(symbol) == 1 {
        if let Some(branches) = isolate(&equation.lhs, &equation.rhs, symbol) {
            let mut values: Vec<f64> = branches
                .iter()
                .filter_map(|branch| evaluate(branch).ok())
                .filter(|value| value.is_finite() && equation.holds_at(symbol, *value))
                .collect();
            values.sort_by(f64::total_cmp);
            values.dedup_by(|a, b| approx_eq(*a, *b, CHECK_TOLERANCE));
            return Ok(values.into_iter().map(Solution::Real).collect());
        }
    }

    let residual = equation.residual();
    let found = newton::find_roots(
        |x| evaluate(&residual.substitute(symbol, &Expr::number(x))).ok(),
        options,
    );
    if found.is_empty() {
        return Err(SolveError::NoConvergence {
            symbol: symbol.to_string(),
        });
    }
    Ok(found.into_iter().map(Solution::Real).collect())
}

fn polynomial_solutions(
    rational: &Rational,
    symbol: &str,
    options: &SolveOptions,
) -> Result<Vec<Solution>, SolveError> {
    let found = roots(&rational.num.square_free(), options.max_iterations.max(500));
    if found.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(SolveError::NoConvergence {
            symbol: symbol.to_string(),
        });
    }

    let mut real: Vec<f64> = Vec::new();
    let mut complex: Vec<Complex64> = Vec::new();
    for z in found {
        // roots of the denominator are excluded from the domain
        if rational.den.degree() > 0 && rational.den.eval_complex(z).norm() <= 1e-9 {
            continue;
        }
        if z.im.abs() <= IMAG_TOLERANCE * z.re.abs().max(1.0) {
            real.push(z.re);
        } else {
            complex.push(z);
        }
    }

    real.sort_by(f64::total_cmp);
    real.dedup_by(|a, b| approx_eq(*a, *b, CHECK_TOLERANCE));
    complex.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
    complex.dedup_by(|a, b| (*a - *b).norm() <= CHECK_TOLERANCE * a.norm().max(1.0));

    Ok(real
        .into_iter()
        .map(Solution::Real)
        .chain(complex.into_iter().map(Solution::Complex))
        .collect())
}

fn solve_several(equation: &Equation, symbols: &[String]) -> Result<Vec<Solution>, SolveError> {
    for symbol in symbols {
        if equation.occurrences(symbol) != 1 {
            continue;
        }
        if let Some(branches) = isolate(&equation.lhs, &equation.rhs, symbol) {
            return Ok(branches
                .into_iter()
                .map(|value| Solution::Assignment {
                    symbol: symbol.clone(),
                    value,
                })
                .collect());
        }
    }
    Err(SolveError::unsupported(format!(
        "no unknown among {} can be isolated",
        symbols.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn equation(lhs: &str, rhs: &str) -> Equation {
        Equation::new(parse(lhs).expect("lhs"), parse(rhs).expect("rhs"))
    }

    fn solved(lhs: &str, rhs: &str) -> String {
        let solutions = solve(&equation(lhs, rhs), &SolveOptions::default()).expect("solve");
        format_solutions(&solutions)
    }

    #[test]
    fn linear_equation() {
        assert_eq!(solved("x + 5", "10"), "[5]");
        assert_eq!(solved("2 * x", "7"), "[3.5]");
    }

    #[test]
    fn quadratic_roots_sorted() {
        assert_eq!(solved("x^2", "4"), "[-2, 2]");
        assert_eq!(solved("x^2 - 2*x + 1", "0"), "[1]");
    }

    #[test]
    fn complex_pair_follows_reals() {
        assert_eq!(solved("x^2 + 1", "0"), "[-I, I]");
        assert_eq!(solved("x^2 - 2*x + 5", "0"), "[1 - 2*I, 1 + 2*I]");
    }

    #[test]
    fn constant_equation_has_no_solutions() {
        assert_eq!(solved("x - x", "0"), "[]");
        assert_eq!(solved("2 + 2", "4"), "[]");
    }

    #[test]
    fn denominator_roots_are_discarded() {
        assert_eq!(solved("x^2 / x", "0"), "[]");
        assert_eq!(solved("1 / x", "2"), "[0.5]");
    }

    #[test]
    fn cubic_through_simultaneous_iteration() {
        assert_eq!(solved("x^3 - 6*x^2 + 11*x", "6"), "[1, 2, 3]");
    }

    #[test]
    fn repeated_roots_are_reported_once() {
        assert_eq!(solved("(x - 1)^3", "0"), "[1]");
        assert_eq!(solved("x^3 - 3*x^2 + 3*x - 1", "0"), "[1]");
        assert_eq!(solved("(x - 2)^4", "0"), "[2]");
        assert_eq!(solved("(x - 1)^2 * (x + 2)", "0"), "[-2, 1]");
        assert_eq!(solved("(x^2 + 1)^2", "0"), "[-I, I]");
    }

    #[test]
    fn high_degree_roots_of_unity() {
        let solutions = solve(&equation("x^20", "1"), &SolveOptions::default()).unwrap();
        assert_eq!(solutions.len(), 20);
        assert!(matches!(solutions[0], Solution::Real(r) if (r + 1.0).abs() < 1e-12));
        assert!(matches!(solutions[1], Solution::Real(r) if (r - 1.0).abs() < 1e-12));
        assert!(solutions[2..]
            .iter()
            .all(|s| matches!(s, Solution::Complex(z) if (z.norm() - 1.0).abs() < 1e-9)));
    }

    #[test]
    fn degree_beyond_expansion_limit_stays_finite() {
        assert_eq!(solved("((x^32)^32)^2", "1"), "[-1, 1]");
    }

    #[test]
    fn trig_isolation_gives_both_branches() {
        let solutions = solve(&equation("sin(x)", "0.5"), &SolveOptions::default()).unwrap();
        assert_eq!(solutions.len(), 2);
        let Solution::Real(first) = solutions[0] else {
            panic!("expected real root");
        };
        assert!((first - std::f64::consts::FRAC_PI_6).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_branches_are_dropped() {
        assert_eq!(solved("sin(x)", "2"), "[]");
    }

    #[test]
    fn several_unknowns_give_an_assignment() {
        assert_eq!(solved("a + b", "10"), "[{a: 10 - b}]");
    }

    #[test]
    fn falls_back_to_newton() {
        let solutions = solve(&equation("x + sin(x)", "1"), &SolveOptions::default()).unwrap();
        assert_eq!(solutions.len(), 1);
        let Solution::Real(root) = solutions[0] else {
            panic!("expected real root");
        };
        assert!((root + root.sin() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unsolvable_several_unknowns() {
        let err = solve(&equation("a * a", "b * b"), &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, SolveError::Unsupported(_)));
    }

    #[test]
    fn equation_check_is_tolerant() {
        assert_eq!(equation("0.1 + 0.2", "0.3").check(), Some(true));
        assert_eq!(equation("2 + 2", "5").check(), Some(false));
        assert_eq!(equation("x", "1").check(), None);
    }
}
