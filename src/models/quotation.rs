use super::{contains_ci, Module, OperationalRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A priced quotation sent to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    pub id: i64,
    pub code: String,
    pub client: String,
    #[serde(default)]
    pub description: String,
    pub status: QuotationStatus,

    /// Quoted amount, never negative
    pub amount: f64,

    pub created_at: DateTime<Utc>,
    #[serde(default = "super::default_active")]
    pub active: bool,
}

impl Quotation {
    /// Amount clamped to the non-negative domain
    pub fn amount(&self) -> f64 {
        if self.amount.is_finite() {
            self.amount.max(0.0)
        } else {
            0.0
        }
    }
}

impl OperationalRecord for Quotation {
    const MODULE: Module = Module::Quotations;

    fn reference_date(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn matches_text(&self, needle: &str) -> bool {
        contains_ci(&self.code, needle)
            || contains_ci(&self.client, needle)
            || contains_ci(&self.description, needle)
    }

    fn monetary_amount(&self) -> f64 {
        self.amount()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Expired,
}
