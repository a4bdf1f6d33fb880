//! Numeric helpers shared by the aggregators
//!
//! Every ratio goes through these functions so that an empty denominator
//! yields `None` (or 0 for plain averages) instead of NaN or infinity.

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, 0 for an empty sample
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `part * 100 / whole`, rounded and bounded to [0, 100]; `None` when `whole` is 0
pub fn ratio_pct(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    let pct = part as f64 * 100.0 / whole as f64;
    Some(round2(pct.clamp(0.0, 100.0)))
}

/// `(current - previous) * 100 / previous`, rounded; `None` when there is no
/// previous value or it is 0
pub fn variation_pct(current: f64, previous: Option<f64>) -> Option<f64> {
    match previous {
        Some(previous) if previous > 0.0 => Some(round2((current - previous) * 100.0 / previous)),
        _ => None,
    }
}
