//! Period-over-period trend computation
//!
//! Per-period totals are aggregated in application code and the deltas are
//! computed here, pairing each period with its calendar predecessor rather
//! than with its neighbour in a series.

use crate::models::Module;
use crate::reporting::buckets::Period;
use crate::reporting::statistics::variation_pct;
use serde::{Deserialize, Serialize};

/// Current-vs-previous comparison for one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub module: Module,

    /// Label of the current period
    pub period: String,

    pub current_total: u64,

    /// Null when the preceding period has no known total
    pub previous_total: Option<u64>,

    /// Null when the previous total is absent or zero
    pub variation_pct: Option<f64>,
}

/// Trend point for exactly `period`, if `count` knows its total.
///
/// `count` returns the total of a period, or `None` when the period is not
/// covered.
pub fn trend_for<F>(module: Module, period: Period, count: F) -> Option<TrendPoint>
where
    F: Fn(Period) -> Option<u64>,
{
    let current = count(period)?;
    let previous = period.previous().and_then(&count);

    Some(TrendPoint {
        module,
        period: period.key(),
        current_total: current,
        previous_total: previous,
        variation_pct: variation_pct(current as f64, previous.map(|p| p as f64)),
    })
}
