use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Operational entity type a report can be scoped to.
///
/// Declaration order is the canonical output order for every multi-module
/// response.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Module {
    Orders,
    Visits,
    Quotations,
}

impl Module {
    /// Accepted values for a single-module selector
    pub const NAMES: &'static [&'static str] = &["orders", "visits", "quotations"];
}
