//! Small symbolic math engine: parse, evaluate and solve single-line
//! arithmetic expressions and equations.
//!
//! ```
//! use mathrepair_symbolic::{parse, evaluate, solve, Equation, SolveOptions, format_solutions};
//!
//! let value = evaluate(&parse("2 + 2").unwrap()).unwrap();
//! assert_eq!(value, 4.0);
//!
//! let eq = Equation::new(parse("x + 5").unwrap(), parse("10").unwrap());
//! let solutions = solve(&eq, &SolveOptions::default()).unwrap();
//! assert_eq!(format_solutions(&solutions), "[5]");
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod format;
mod isolate;
pub mod lexer;
mod newton;
pub mod parser;
mod poly;
pub mod solve;

pub use ast::{BinOp, Constant, Expr, Func};
pub use error::{EvalError, ParseError, SolveError};
pub use eval::{evaluate, EvalResult};
pub use format::format_number;
pub use parser::parse;
pub use solve::{format_solutions, solve, Equation, Solution, SolveOptions};

pub use num_complex::Complex64;
