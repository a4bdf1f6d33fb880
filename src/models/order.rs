use super::{contains_ci, Module, OperationalRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A maintenance service order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: i64,

    /// Human-facing order number
    pub code: String,

    pub client: String,

    /// Equipment under maintenance
    pub equipment: String,

    #[serde(default)]
    pub description: String,

    pub status: OrderStatus,

    pub priority: Priority,

    pub order_date: DateTime<Utc>,

    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default = "super::default_active")]
    pub active: bool,
}

impl OperationalRecord for ServiceOrder {
    const MODULE: Module = Module::Orders;

    fn reference_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn matches_text(&self, needle: &str) -> bool {
        contains_ci(&self.code, needle)
            || contains_ci(&self.client, needle)
            || contains_ci(&self.equipment, needle)
            || contains_ci(&self.description, needle)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Closed,
}

impl OrderStatus {
    /// Whether the order's work is finished
    pub fn is_finished(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Closed)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}
