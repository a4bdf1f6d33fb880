use super::{contains_ci, Module, OperationalRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// An on-site technician visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldVisit {
    pub id: i64,
    pub code: String,
    pub client: String,
    pub technician: String,
    pub status: VisitStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default = "super::default_active")]
    pub active: bool,
}

impl OperationalRecord for FieldVisit {
    const MODULE: Module = Module::Visits;

    fn reference_date(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn matches_text(&self, needle: &str) -> bool {
        contains_ci(&self.code, needle)
            || contains_ci(&self.client, needle)
            || contains_ci(&self.technician, needle)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisitStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
    Closed,
}

impl VisitStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, VisitStatus::Completed | VisitStatus::Closed)
    }
}
