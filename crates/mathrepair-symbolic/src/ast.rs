//! Expression tree produced by the parser.
//!
//! Nodes are built exactly as written: no constant folding, no reordering.
//! Grouping parentheses are not stored, [`Display`] re-inserts the minimal set
//! needed to read the tree back unchanged.

use std::collections::BTreeSet;
use std::fmt;

use crate::format::format_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }

    const fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 4,
        }
    }
}

/// Single-argument functions understood by the parser and evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Log,
    Ln,
    Exp,
    Abs,
}

impl Func {
    pub const ALL: [Func; 11] = [
        Func::Sin,
        Func::Cos,
        Func::Tan,
        Func::Asin,
        Func::Acos,
        Func::Atan,
        Func::Sqrt,
        Func::Log,
        Func::Ln,
        Func::Exp,
        Func::Abs,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|func| func.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Sqrt => "sqrt",
            Func::Log => "log",
            Func::Ln => "ln",
            Func::Exp => "exp",
            Func::Abs => "abs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    Infinity,
    NaN,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            "oo" | "inf" => Some(Constant::Infinity),
            "nan" => Some(Constant::NaN),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
            Constant::Infinity => "oo",
            Constant::NaN => "nan",
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
            Constant::Infinity => f64::INFINITY,
            Constant::NaN => f64::NAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Constant(Constant),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Func,
        arg: Box<Expr>,
    },
}

const NEG_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(func: Func, arg: Expr) -> Self {
        Expr::Call {
            func,
            arg: Box::new(arg),
        }
    }

    pub fn neg(inner: Expr) -> Self {
        Expr::Neg(Box::new(inner))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Mul, lhs, rhs)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Div, lhs, rhs)
    }

    pub fn pow(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Pow, lhs, rhs)
    }

    /// Names of every symbol in the tree, sorted.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Symbol(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) => inner.collect_symbols(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
            Expr::Call { arg, .. } => arg.collect_symbols(out),
            Expr::Number(_) | Expr::Constant(_) => {}
        }
    }

    /// Number of times `name` occurs in the tree.
    pub fn occurrences(&self, name: &str) -> usize {
        match self {
            Expr::Symbol(s) => usize::from(s == name),
            Expr::Neg(inner) => inner.occurrences(name),
            Expr::Binary { lhs, rhs, .. } => lhs.occurrences(name) + rhs.occurrences(name),
            Expr::Call { arg, .. } => arg.occurrences(name),
            Expr::Number(_) | Expr::Constant(_) => 0,
        }
    }

    pub fn contains_symbol(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    /// Replace every occurrence of `name` with `value`.
    pub fn substitute(&self, name: &str, value: &Expr) -> Expr {
        match self {
            Expr::Symbol(s) if s == name => value.clone(),
            Expr::Neg(inner) => Expr::neg(inner.substitute(name, value)),
            Expr::Binary { op, lhs, rhs } => {
                Expr::binary(*op, lhs.substitute(name, value), rhs.substitute(name, value))
            }
            Expr::Call { func, arg } => Expr::call(*func, arg.substitute(name, value)),
            other => other.clone(),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Neg(_) => NEG_PRECEDENCE,
            Expr::Number(value) if *value < 0.0 => NEG_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => f.write_str(&format_number(*value)),
            Expr::Symbol(name) => f.write_str(name),
            Expr::Constant(c) => f.write_str(c.name()),
            Expr::Neg(inner) => {
                f.write_str("-")?;
                inner.fmt_operand(f, inner.precedence() <= NEG_PRECEDENCE)
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                if *op == BinOp::Pow {
                    // right-associative: a^b^c is a^(b^c)
                    lhs.fmt_operand(f, lhs.precedence() <= prec)?;
                    f.write_str("^")?;
                    rhs.fmt_operand(f, rhs.precedence() < prec)
                } else {
                    lhs.fmt_operand(f, lhs.precedence() < prec)?;
                    write!(f, " {} ", op.symbol())?;
                    let rhs_prec = rhs.precedence();
                    rhs.fmt_operand(f, rhs_prec <= prec || rhs_prec == NEG_PRECEDENCE)
                }
            }
            Expr::Call { func, arg } => write!(f, "{}({})", func.name(), arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(v: f64) -> Expr {
        Expr::number(v)
    }

    #[test]
    fn renders_binary_with_spaces() {
        assert_eq!(Expr::add(n(2.0), n(2.0)).to_string(), "2 + 2");
        assert_eq!(Expr::mul(n(3.0), Expr::symbol("x")).to_string(), "3 * x");
    }

    #[test]
    fn keeps_right_grouping_of_left_associative_ops() {
        let grouped = Expr::sub(n(1.0), Expr::sub(n(2.0), n(3.0)));
        assert_eq!(grouped.to_string(), "1 - (2 - 3)");
        let chained = Expr::sub(Expr::sub(n(1.0), n(2.0)), n(3.0));
        assert_eq!(chained.to_string(), "1 - 2 - 3");
    }

    #[test]
    fn power_is_right_associative() {
        let expr = Expr::pow(n(2.0), Expr::pow(n(3.0), n(2.0)));
        assert_eq!(expr.to_string(), "2^3^2");
        let left = Expr::pow(Expr::pow(n(2.0), n(3.0)), n(2.0));
        assert_eq!(left.to_string(), "(2^3)^2");
        let neg_base = Expr::pow(Expr::neg(n(2.0)), n(2.0));
        assert_eq!(neg_base.to_string(), "(-2)^2");
    }

    #[test]
    fn negative_number_after_operator_is_parenthesized() {
        let expr = Expr::sub(Expr::symbol("x"), n(-3.0));
        assert_eq!(expr.to_string(), "x - (-3)");
    }

    #[test]
    fn call_renders_argument_without_extra_parens() {
        let arg = Expr::div(Expr::mul(n(30.0), Expr::Constant(Constant::Pi)), n(180.0));
        assert_eq!(Expr::call(Func::Sin, arg).to_string(), "sin(30 * pi / 180)");
    }

    #[test]
    fn free_symbols_are_sorted_and_unique() {
        let expr = Expr::add(
            Expr::symbol("b"),
            Expr::mul(Expr::symbol("a"), Expr::symbol("b")),
        );
        let names: Vec<_> = expr.free_symbols().into_iter().collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(expr.occurrences("b"), 2);
    }

    #[test]
    fn substitute_replaces_every_occurrence() {
        let expr = Expr::add(Expr::symbol("x"), Expr::symbol("x"));
        let replaced = expr.substitute("x", &n(4.0));
        assert_eq!(replaced.to_string(), "4 + 4");
        assert!(replaced.free_symbols().is_empty());
    }
}
