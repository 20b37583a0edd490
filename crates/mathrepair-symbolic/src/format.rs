//! Number rendering shared by expression display and solution output.

/// Significant digits kept when printing computed values.
pub const DISPLAY_DIGITS: i32 = 12;

/// Render a computed value for humans.
///
/// Integral values print without a fractional part, everything else is rounded
/// to [`DISPLAY_DIGITS`] significant digits so `sin(pi/6)` shows as `0.5`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "oo" } else { "-oo" }.to_string();
    }
    let rounded = round_significant(value, DISPLAY_DIGITS);
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }
    format!("{}", rounded)
}

/// Round `value` to `digits` significant digits.
pub fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(digits - 1 - magnitude);
    if !scale.is_finite() || scale == 0.0 {
        return value;
    }
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
