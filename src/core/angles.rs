//! Degree-to-radian rewriting of trigonometric calls.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref TRIG_CALL: Regex = Regex::new(r"\b(asin|acos|atan|sin|cos|tan)\(").unwrap();
}

/// Unit that trigonometric arguments are written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    /// Diagram angles are drawn and labeled in degrees.
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "deg" | "degree" | "degrees" => Some(AngleUnit::Degrees),
            "rad" | "radian" | "radians" => Some(AngleUnit::Radians),
            _ => None,
        }
    }
}

/// Rewrite `f(X)` into `f((X)*pi/180)` for every trig function `f`.
///
/// `X` runs to the parenthesis closing the call. Scanning resumes after that
/// parenthesis, so a trig call nested inside another one is copied unchanged:
/// `sin(cos(30))` becomes `sin((cos(30))*pi/180)`. A call without a closing
/// parenthesis ends the rewrite and the rest is copied verbatim.
pub fn degrees_to_radians(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() + 16);
    let mut pos = 0;
    while let Some(call) = TRIG_CALL.find_at(expr, pos) {
        let open = call.end();
        let Some(close) = matching_paren(expr, open) else {
            break;
        };
        out.push_str(&expr[pos..open]);
        out.push('(');
        out.push_str(&expr[open..close]);
        out.push_str(")*pi/180)");
        pos = close + 1;
    }
    out.push_str(&expr[pos..]);
    out
}

/// Apply [`degrees_to_radians`] only when arguments are in degrees.
pub fn normalize_angles(expr: &str, unit: AngleUnit) -> String {
    match unit {
        AngleUnit::Degrees => degrees_to_radians(expr),
        AngleUnit::Radians => expr.to_string(),
    }
}

/// Byte index of the `)` closing a call whose argument starts at `start`.
fn matching_paren(expr: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, b) in expr.bytes().enumerate().skip(start) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
