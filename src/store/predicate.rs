use crate::models::OperationalRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Structured row filter: active rows whose reference date falls inside
/// the inclusive `[from, to]` calendar-day range.
///
/// An absent bound means "no constraint" on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePredicate {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DatePredicate {
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Predicate with no date constraint
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check a raw timestamp and active flag against the predicate
    pub fn matches(&self, timestamp: DateTime<Utc>, active: bool) -> bool {
        if !active {
            return false;
        }

        let day = timestamp.date_naive();
        if let Some(from) = self.from {
            if day < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if day > to {
                return false;
            }
        }

        true
    }

    pub fn matches_record<R: OperationalRecord>(&self, record: &R) -> bool {
        self.matches(record.reference_date(), record.is_active())
    }
}

/// A full row query. Rows come back newest first by reference date, ties
/// broken by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowQuery {
    pub predicate: DatePredicate,
}

impl RowQuery {
    pub fn newest_first(predicate: DatePredicate) -> Self {
        Self { predicate }
    }
}
