//! Numeric evaluation of expression trees.

use crate::ast::{BinOp, Expr, Func};
use crate::error::EvalError;

pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluate `expr` to a float. Trigonometric functions take radians.
pub fn evaluate(expr: &Expr) -> EvalResult<f64> {
    let value = eval_node(expr)?;
    if value.is_nan() {
        return Err(EvalError::Undefined);
    }
    Ok(value)
}

fn eval_node(expr: &Expr) -> EvalResult<f64> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Constant(constant) => Ok(constant.value()),
        Expr::Symbol(name) => Err(EvalError::UnboundSymbol(name.clone())),
        Expr::Neg(inner) => Ok(-eval_node(inner)?),
        Expr::Binary { op, lhs, rhs } => {
            let a = eval_node(lhs)?;
            let b = eval_node(rhs)?;
            apply_binary(*op, a, b)
        }
        Expr::Call { func, arg } => apply_func(*func, eval_node(arg)?),
    }
}

pub(crate) fn apply_binary(op: BinOp, a: f64, b: f64) -> EvalResult<f64> {
    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div => {
            if b == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            let value = a.powf(b);
            if value.is_nan() && !a.is_nan() && !b.is_nan() {
                return Err(EvalError::domain("pow", a));
            }
            Ok(value)
        }
    }
}

pub(crate) fn apply_func(func: Func, x: f64) -> EvalResult<f64> {
    let value = match func {
        Func::Sin => x.sin(),
        Func::Cos => x.cos(),
        Func::Tan => x.tan(),
        Func::Asin => {
            if !(-1.0..=1.0).contains(&x) {
                return Err(EvalError::domain("asin", x));
            }
            x.asin()
        }
        Func::Acos => {
            if !(-1.0..=1.0).contains(&x) {
                return Err(EvalError::domain("acos", x));
            }
            x.acos()
        }
        Func::Atan => x.atan(),
        Func::Sqrt => {
            if x < 0.0 {
                return Err(EvalError::domain("sqrt", x));
            }
            x.sqrt()
        }
        Func::Log | Func::Ln => {
            if x <= 0.0 {
                return Err(EvalError::domain(func.name(), x));
            }
            x.ln()
        }
        Func::Exp => x.exp(),
        Func::Abs => x.abs(),
    };
    Ok(value)
}
