//! Rational-polynomial view of an expression in one unknown, plus root finding.

use num_complex::Complex64;

use crate::ast::{BinOp, Expr};
use crate::eval::evaluate;

/// Largest integer exponent expanded symbolically.
const MAX_POWER: i32 = 32;
/// Largest degree a numerator or denominator may reach.
const MAX_DEGREE: usize = 64;
const COEFF_EPSILON: f64 = 1e-12;
/// Coefficients at or below this, relative to a unit-scaled polynomial, are
/// noise left over from exact cancellation.
const GCD_EPSILON: f64 = 1e-9;

/// Dense polynomial, coefficients from the constant term upward.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Poly {
    coeffs: Vec<f64>,
}

impl Poly {
    pub(crate) fn constant(value: f64) -> Self {
        Self::from_coeffs(vec![value])
    }

    pub(crate) fn identity() -> Self {
        Self::from_coeffs(vec![0.0, 1.0])
    }

    pub(crate) fn from_coeffs(coeffs: Vec<f64>) -> Self {
        let mut poly = Self { coeffs };
        poly.trim();
        poly
    }

    fn trim(&mut self) {
        let scale = self
            .coeffs
            .iter()
            .fold(0.0_f64, |acc, c| acc.max(c.abs()));
        while self.coeffs.len() > 1 {
            let last = self.coeffs[self.coeffs.len() - 1];
            if last.abs() <= COEFF_EPSILON * scale.max(1.0) {
                self.coeffs.pop();
            } else {
                break;
            }
        }
        if self.coeffs.is_empty() {
            self.coeffs.push(0.0);
        }
    }

    pub(crate) fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub(crate) fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.degree() == 0 && self.coeffs[0] == 0.0
    }

    fn add(&self, other: &Poly) -> Poly {
        let len = self.coeffs.len().max(other.coeffs.len());
        let coeffs = (0..len)
            .map(|i| {
                self.coeffs.get(i).copied().unwrap_or(0.0)
                    + other.coeffs.get(i).copied().unwrap_or(0.0)
            })
            .collect();
        Poly::from_coeffs(coeffs)
    }

    fn scale(&self, factor: f64) -> Poly {
        Poly::from_coeffs(self.coeffs.iter().map(|c| c * factor).collect())
    }

    fn mul(&self, other: &Poly) -> Poly {
        let mut coeffs = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Poly::from_coeffs(coeffs)
    }

    fn powi(&self, exponent: u32) -> Poly {
        (0..exponent).fold(Poly::constant(1.0), |acc, _| acc.mul(self))
    }

    pub(crate) fn eval_complex(&self, z: Complex64) -> Complex64 {
        self.coeffs
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
    }

    fn derivative(&self) -> Poly {
        Poly::from_coeffs(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * i as f64)
                .collect(),
        )
    }

    /// Scaled so the largest coefficient has magnitude one.
    fn unit_scaled(&self) -> Poly {
        let scale = self.coeffs.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
        if scale == 0.0 {
            return self.clone();
        }
        self.scale(1.0 / scale)
    }

    /// Zero every coefficient not above `epsilon` in magnitude.
    fn chop(&self, epsilon: f64) -> Poly {
        Poly::from_coeffs(
            self.coeffs
                .iter()
                .map(|&c| if c.abs() <= epsilon { 0.0 } else { c })
                .collect(),
        )
    }

    /// Long division, quotient and remainder.
    fn div_rem(&self, divisor: &Poly) -> (Poly, Poly) {
        let dn = divisor.degree();
        if dn > self.degree() {
            return (Poly::constant(0.0), self.clone());
        }
        let lead = divisor.coeffs[dn];
        let mut rem = self.coeffs.clone();
        let mut quot = vec![0.0; self.degree() - dn + 1];
        for k in (0..quot.len()).rev() {
            let factor = rem[k + dn] / lead;
            quot[k] = factor;
            for (j, c) in divisor.coeffs.iter().enumerate() {
                rem[k + j] -= factor * c;
            }
        }
        rem.truncate(dn.max(1));
        (Poly::from_coeffs(quot), Poly::from_coeffs(rem))
    }

    /// Greatest common divisor up to [`GCD_EPSILON`], unit-scaled.
    fn gcd(&self, other: &Poly) -> Poly {
        let mut a = self.unit_scaled();
        let mut b = other.unit_scaled().chop(GCD_EPSILON);
        while !b.is_zero() {
            let (_, rem) = a.div_rem(&b);
            a = b;
            b = rem.chop(GCD_EPSILON).unit_scaled();
        }
        a
    }

    /// Same roots, each with multiplicity one.
    ///
    /// Simultaneous iteration converges poorly on repeated roots and scatters
    /// them into near-identical complex values, so `p` is divided by
    /// `gcd(p, p')` first.
    pub(crate) fn square_free(&self) -> Poly {
        if self.degree() < 2 {
            return self.clone();
        }
        let common = self.gcd(&self.derivative());
        if common.degree() == 0 {
            return self.clone();
        }
        let (quot, rem) = self.unit_scaled().div_rem(&common);
        if rem.chop(GCD_EPSILON.sqrt()).is_zero() {
            quot
        } else {
            self.clone()
        }
    }
}

/// `num / den` with both sides polynomial in the unknown.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Rational {
    pub(crate) num: Poly,
    pub(crate) den: Poly,
}

impl Rational {
    fn degree(&self) -> usize {
        self.num.degree().max(self.den.degree())
    }

    fn constant(value: f64) -> Self {
        Self::new(Poly::constant(value), Poly::constant(1.0))
    }

    fn new(num: Poly, den: Poly) -> Self {
        // keep constant denominators folded into the numerator
        if den.degree() == 0 && den.coeffs[0] != 0.0 && den.coeffs[0] != 1.0 {
            let factor = 1.0 / den.coeffs[0];
            return Self {
                num: num.scale(factor),
                den: Poly::constant(1.0),
            };
        }
        Self { num, den }
    }

    fn constant_value(&self) -> Option<f64> {
        if self.num.degree() == 0 && self.den.degree() == 0 {
            Some(self.num.coeffs[0] / self.den.coeffs[0])
        } else {
            None
        }
    }

    fn neg(&self) -> Rational {
        Rational::new(self.num.scale(-1.0), self.den.clone())
    }

    fn add(&self, other: &Rational) -> Rational {
        if self.den == other.den {
            return Rational::new(self.num.add(&other.num), self.den.clone());
        }
        Rational::new(
            self.num.mul(&other.den).add(&other.num.mul(&self.den)),
            self.den.mul(&other.den),
        )
    }

    fn mul(&self, other: &Rational) -> Rational {
        Rational::new(self.num.mul(&other.num), self.den.mul(&other.den))
    }

    fn div(&self, other: &Rational) -> Option<Rational> {
        if other.num.is_zero() {
            return None;
        }
        Some(Rational::new(
            self.num.mul(&other.den),
            self.den.mul(&other.num),
        ))
    }

    fn powi(&self, exponent: i32) -> Rational {
        let magnitude = exponent.unsigned_abs();
        let num = self.num.powi(magnitude);
        let den = self.den.powi(magnitude);
        if exponent >= 0 {
            Rational::new(num, den)
        } else {
            Rational::new(den, num)
        }
    }
}

/// View `expr` as a ratio of polynomials in `var`, if it is one.
pub(crate) fn to_rational(expr: &Expr, var: &str) -> Option<Rational> {
    match expr {
        Expr::Number(value) => finite_constant(*value),
        Expr::Constant(constant) => finite_constant(constant.value()),
        Expr::Symbol(name) if name == var => Some(Rational::new(
            Poly::identity(),
            Poly::constant(1.0),
        )),
        Expr::Symbol(_) => None,
        Expr::Neg(inner) => Some(to_rational(inner, var)?.neg()),
        Expr::Binary { op, lhs, rhs } => {
            let a = to_rational(lhs, var)?;
            let b = to_rational(rhs, var)?;
            if !matches!(op, BinOp::Pow) && a.degree() + b.degree() > MAX_DEGREE {
                return None;
            }
            match op {
                BinOp::Add => Some(a.add(&b)),
                BinOp::Sub => Some(a.add(&b.neg())),
                BinOp::Mul => Some(a.mul(&b)),
                BinOp::Div => a.div(&b),
                BinOp::Pow => rational_pow(&a, &b),
            }
        }
        Expr::Call { arg, .. } => {
            if arg.contains_symbol(var) {
                return None;
            }
            finite_constant(evaluate(expr).ok()?)
        }
    }
}

fn finite_constant(value: f64) -> Option<Rational> {
    value.is_finite().then(|| Rational::constant(value))
}

fn rational_pow(base: &Rational, exponent: &Rational) -> Option<Rational> {
    let e = exponent.constant_value()?;
    if let Some(b) = base.constant_value() {
        if b == 0.0 && e < 0.0 {
            return None;
        }
        return finite_constant(b.powf(e));
    }
    if e.fract() != 0.0 || e.abs() > f64::from(MAX_POWER) {
        return None;
    }
    let e = e as i32;
    if base.degree() * e.unsigned_abs() as usize > MAX_DEGREE {
        return None;
    }
    if e < 0 && base.num.is_zero() {
        return None;
    }
    Some(base.powi(e))
}

/// All complex roots of `poly`, with multiplicity.
///
/// Pass a [`Poly::square_free`] polynomial when only distinct roots matter.
pub(crate) fn roots(poly: &Poly, max_iterations: usize) -> Vec<Complex64> {
    match poly.degree() {
        0 => Vec::new(),
        1 => {
            let c = poly.coeffs();
            vec![Complex64::new(-c[0] / c[1], 0.0)]
        }
        2 => quadratic_roots(poly.coeffs()),
        _ => durand_kerner(poly, max_iterations),
    }
}

fn quadratic_roots(c: &[f64]) -> Vec<Complex64> {
    let (a, b, k) = (c[2], c[1], c[0]);
    let disc = b * b - 4.0 * a * k;
    let scale = (b * b).max((4.0 * a * k).abs());
    if disc.abs() <= COEFF_EPSILON * scale {
        return vec![Complex64::new(-b / (2.0 * a), 0.0)];
    }
    if disc > 0.0 {
        let sqrt_disc = disc.sqrt();
        let q = -0.5 * (b + b.signum() * sqrt_disc);
        return vec![Complex64::new(q / a, 0.0), Complex64::new(k / q, 0.0)];
    }
    let re = -b / (2.0 * a);
    let im = (-disc).sqrt() / (2.0 * a).abs();
    vec![Complex64::new(re, -im), Complex64::new(re, im)]
}

fn durand_kerner(poly: &Poly, max_iterations: usize) -> Vec<Complex64> {
    let lead = poly.coeffs()[poly.degree()];
    let monic = poly.scale(1.0 / lead);
    let degree = monic.degree();

    let seed = Complex64::new(0.4, 0.9);
    let mut current: Vec<Complex64> = (0..degree).map(|k| seed.powu(k as u32)).collect();

    for _ in 0..max_iterations {
        let mut max_delta = 0.0_f64;
        for i in 0..degree {
            let zi = current[i];
            let denom = current
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .fold(Complex64::new(1.0, 0.0), |acc, (_, zj)| acc * (zi - zj));
            if denom.norm() == 0.0 {
                continue;
            }
            let delta = monic.eval_complex(zi) / denom;
            current[i] = zi - delta;
            max_delta = max_delta.max(delta.norm() / (1.0 + current[i].norm()));
        }
        if max_delta < 1e-15 {
            break;
        }
    }

    current
        .into_iter()
        .map(|z| polish(&monic, z))
        .collect()
}

fn polish(poly: &Poly, mut z: Complex64) -> Complex64 {
    let derivative = poly.derivative();
    for _ in 0..3 {
        let d = derivative.eval_complex(z);
        if d.norm() == 0.0 {
            break;
        }
        let next = z - poly.eval_complex(z) / d;
        if !next.re.is_finite() || !next.im.is_finite() {
            break;
        }
        z = next;
    }
    z
}
