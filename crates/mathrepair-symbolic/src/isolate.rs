//! Symbolic isolation of an unknown that occurs exactly once.
//!
//! The side holding the unknown is peeled one node at a time, applying the
//! inverse operation to the other side. Periodic and even functions fan out
//! into several branches.

use crate::ast::{BinOp, Constant, Expr, Func};
use crate::eval::evaluate;

/// Candidate expressions for `symbol` such that `lhs = rhs` holds.
///
/// Returns `None` when `symbol` does not occur exactly once or a node on the
/// path has no usable inverse.
pub(crate) fn isolate(lhs: &Expr, rhs: &Expr, symbol: &str) -> Option<Vec<Expr>> {
    let (mut target, other) = match (lhs.occurrences(symbol), rhs.occurrences(symbol)) {
        (1, 0) => (lhs, rhs),
        (0, 1) => (rhs, lhs),
        _ => return None,
    };
    let mut branches = vec![other.clone()];

    loop {
        match target {
            Expr::Symbol(name) if name == symbol => return Some(branches),
            Expr::Neg(inner) => {
                branches = branches.into_iter().map(Expr::neg).collect();
                target = &**inner;
            }
            Expr::Binary { op, lhs, rhs } => {
                let on_left = lhs.contains_symbol(symbol);
                let (inner, known) = if on_left { (&**lhs, &**rhs) } else { (&**rhs, &**lhs) };
                branches = invert_binary(*op, on_left, known, branches)?;
                target = inner;
            }
            Expr::Call { func, arg } => {
                branches = branches
                    .into_iter()
                    .flat_map(|o| invert_call(*func, o))
                    .collect();
                target = &**arg;
            }
            _ => return None,
        }
    }
}

fn pi() -> Expr {
    Expr::Constant(Constant::Pi)
}

fn invert_binary(op: BinOp, on_left: bool, known: &Expr, branches: Vec<Expr>) -> Option<Vec<Expr>> {
    let k = || known.clone();
    let out = match (op, on_left) {
        // u + k = o, k + u = o
        (BinOp::Add, _) => branches.into_iter().map(|o| Expr::sub(o, k())).collect(),
        // u - k = o
        (BinOp::Sub, true) => branches.into_iter().map(|o| Expr::add(o, k())).collect(),
        // k - u = o
        (BinOp::Sub, false) => branches.into_iter().map(|o| Expr::sub(k(), o)).collect(),
        (BinOp::Mul, _) => branches.into_iter().map(|o| Expr::div(o, k())).collect(),
        // u / k = o
        (BinOp::Div, true) => branches.into_iter().map(|o| Expr::mul(o, k())).collect(),
        // k / u = o
        (BinOp::Div, false) => branches.into_iter().map(|o| Expr::div(k(), o)).collect(),
        // u ^ k = o
        (BinOp::Pow, true) => invert_power_base(known, branches)?,
        // k ^ u = o
        (BinOp::Pow, false) => branches
            .into_iter()
            .map(|o| Expr::div(Expr::call(Func::Ln, o), Expr::call(Func::Ln, k())))
            .collect(),
    };
    Some(out)
}

fn invert_power_base(exponent: &Expr, branches: Vec<Expr>) -> Option<Vec<Expr>> {
    let root = |o: Expr| Expr::pow(o, Expr::div(Expr::number(1.0), exponent.clone()));
    let Ok(n) = evaluate(exponent) else {
        return Some(branches.into_iter().map(root).collect());
    };
    if n == 0.0 {
        return None;
    }
    let even = n.fract() == 0.0 && (n / 2.0).fract() == 0.0;
    Some(
        branches
            .into_iter()
            .flat_map(|o| {
                let principal = root(o);
                if even {
                    vec![Expr::neg(principal.clone()), principal]
                } else {
                    vec![principal]
                }
            })
            .collect(),
    )
}

fn invert_call(func: Func, o: Expr) -> Vec<Expr> {
    match func {
        Func::Sin => {
            let principal = Expr::call(Func::Asin, o);
            vec![principal.clone(), Expr::sub(pi(), principal)]
        }
        Func::Cos => {
            let principal = Expr::call(Func::Acos, o);
            vec![
                principal.clone(),
                Expr::sub(Expr::mul(Expr::number(2.0), pi()), principal),
            ]
        }
        Func::Tan => vec![Expr::call(Func::Atan, o)],
        Func::Asin => vec![Expr::call(Func::Sin, o)],
        Func::Acos => vec![Expr::call(Func::Cos, o)],
        Func::Atan => vec![Expr::call(Func::Tan, o)],
        Func::Sqrt => vec![Expr::pow(o, Expr::number(2.0))],
        Func::Exp => vec![Expr::call(Func::Ln, o)],
        Func::Log | Func::Ln => vec![Expr::call(Func::Exp, o)],
        Func::Abs => vec![Expr::neg(o.clone()), o],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn isolated(lhs: &str, rhs: &str, symbol: &str) -> Option<Vec<String>> {
        let lhs = parse(lhs).expect("lhs");
        let rhs = parse(rhs).expect("rhs");
        isolate(&lhs, &rhs, symbol).map(|v| v.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn linear_in_several_unknowns() {
        assert_eq!(isolated("a + b", "10", "a"), Some(vec!["10 - b".to_string()]));
        assert_eq!(isolated("a + b", "10", "b"), Some(vec!["10 - a".to_string()]));
    }

    #[test]
    fn unknown_on_the_right_side() {
        assert_eq!(isolated("12", "3 * y", "y"), Some(vec!["12 / 3".to_string()]));
        assert_eq!(isolated("1", "10 - y", "y"), Some(vec!["10 - 1".to_string()]));
    }

    #[test]
    fn sine_fans_out_into_two_branches() {
        assert_eq!(
            isolated("sin(x)", "0.5", "x"),
            Some(vec!["asin(0.5)".to_string(), "pi - asin(0.5)".to_string()])
        );
    }

    #[test]
    fn exponential_unknown_uses_logarithms() {
        assert_eq!(
            isolated("2^x", "8", "x"),
            Some(vec!["ln(8) / ln(2)".to_string()])
        );
    }

    #[test]
    fn repeated_unknown_is_not_isolated() {
        assert_eq!(isolated("x * x", "4", "x"), None);
        assert_eq!(isolated("x", "x + 1", "x"), None);
    }

    #[test]
    fn zero_exponent_has_no_inverse() {
        assert_eq!(isolated("x^0", "1", "x"), None);
    }
}
