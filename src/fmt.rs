//! Number formatting that stays away from `format!` on floats.
//!
//! Float-to-decimal formatting has panicked on some wasm toolchain/browser
//! combinations, so values are scaled and rounded into an `i64` and only
//! integers are formatted. `NaN`/`±Inf` are spelled out.

const MAX_DECIMALS: usize = 9;

/// Round `v` to `decimals` places (the same rounding the labels use).
pub fn quantize(v: f64, decimals: usize) -> f64 {
    if !v.is_finite() {
        return v;
    }
    let scale = 10_f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let q = (v * scale).round() / scale;
    if q.is_finite() {
        q
    } else {
        v
    }
}

/// Fixed-point rendering, e.g. `fmt_fixed(3.14159, 2) == "3.14"`.
pub fn fmt_fixed(v: f64, decimals: usize) -> String {
    if let Some(s) = non_finite(v) {
        return s.to_string();
    }
    let decimals = decimals.min(MAX_DECIMALS);
    let scale_i = 10_i64.pow(decimals as u32);
    let scaled = (v * scale_i as f64).round();
    if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
        return if v.is_sign_negative() { "-Inf" } else { "Inf" }.to_string();
    }

    let scaled = scaled as i64;
    let abs = scaled.unsigned_abs();
    let int_part = abs / scale_i as u64;
    let frac_part = abs % scale_i as u64;

    let mut out = String::new();
    if scaled < 0 {
        out.push('-');
    }
    out.push_str(&int_part.to_string());
    if decimals > 0 {
        out.push('.');
        let frac = frac_part.to_string();
        out.extend(std::iter::repeat('0').take(decimals.saturating_sub(frac.len())));
        out.push_str(&frac);
    }
    out
}

/// Fixed-point rendering left-padded with zeros to `width` characters.
pub fn fmt_fixed_padded(v: f64, decimals: usize, width: usize) -> String {
    let s = fmt_fixed(v, decimals);
    if s.len() >= width || non_finite(v).is_some() {
        return s;
    }
    let pad = width - s.len();
    match s.strip_prefix('-') {
        Some(rest) => format!("-{}{rest}", "0".repeat(pad)),
        None => format!("{}{s}", "0".repeat(pad)),
    }
}

/// Shortest rendering a browser would produce for a number: integral values
/// drop the fractional part (`8.0` shows as `8`).
pub fn fmt_number(v: f64) -> String {
    if let Some(s) = non_finite(v) {
        return s.to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return (v as i64).to_string();
    }
    // Up to nine places, trailing zeros trimmed.
    let s = fmt_fixed(v, MAX_DECIMALS);
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

fn non_finite(v: f64) -> Option<&'static str> {
    if v.is_nan() {
        Some("NaN")
    } else if v.is_infinite() {
        Some(if v > 0.0 { "Inf" } else { "-Inf" })
    } else {
        None
    }
}
