//! Operational records consumed (read-only) by the reporting engine.

mod module;
mod order;
mod quotation;
mod visit;

pub use module::Module;
pub use order::{OrderStatus, Priority, ServiceOrder};
pub use quotation::{Quotation, QuotationStatus};
pub use visit::{FieldVisit, VisitStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Behaviour shared by every record type the engine aggregates.
pub trait OperationalRecord: Clone + Send + Sync + 'static {
    /// Module this record type belongs to
    const MODULE: Module;

    /// Timestamp used for date filtering and period bucketing
    fn reference_date(&self) -> DateTime<Utc>;

    /// Soft-delete marker; inactive rows never reach an aggregate
    fn is_active(&self) -> bool;

    /// Case-insensitive free-text match; `needle` is already lowercased
    fn matches_text(&self, needle: &str) -> bool;

    /// Amount this record contributes to monetary sums
    fn monetary_amount(&self) -> f64 {
        0.0
    }
}

/// Full data set held by a store adapter, as loaded from a seed fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub orders: Vec<ServiceOrder>,
    #[serde(default)]
    pub visits: Vec<FieldVisit>,
    #[serde(default)]
    pub quotations: Vec<Quotation>,
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Rows without an `active` flag are live
fn default_active() -> bool {
    true
}
