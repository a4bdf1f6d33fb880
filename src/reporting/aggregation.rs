//! Per-entity summary aggregation

use crate::models::{
    FieldVisit, OperationalRecord, OrderStatus, Priority, Quotation, QuotationStatus,
    ServiceOrder, VisitStatus,
};
use crate::reporting::buckets::{MonthBucket, PeriodAccumulator};
use crate::reporting::filter::Granularity;
use crate::reporting::statistics::{mean, ratio_pct, round2};
use crate::store::DatePredicate;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;

/// A closed set of keys that a [`KeyCounts`] always reports in full
pub trait CountKey: Copy + PartialEq + IntoEnumIterator + AsRef<str> {}

impl<T> CountKey for T where T: Copy + PartialEq + IntoEnumIterator + AsRef<str> {}

/// Counts for every value of an enum, in declaration order.
///
/// Keys absent from the input are still present with a count of 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCounts<K: CountKey> {
    entries: Vec<(K, u64)>,
}

impl<K: CountKey> KeyCounts<K> {
    pub fn tally<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut entries: Vec<(K, u64)> = K::iter().map(|key| (key, 0)).collect();
        for key in keys {
            if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
                entry.1 += 1;
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: K) -> u64 {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, u64)> + '_ {
        self.entries.iter().copied()
    }
}

impl<K: CountKey> Serialize for KeyCounts<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key.as_ref(), count)?;
        }
        map.end()
    }
}

/// Service order snapshot
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub total: u64,
    pub by_status: KeyCounts<OrderStatus>,
    pub by_priority: KeyCounts<Priority>,

    /// Mean days from order date to closure, over closed orders only
    pub avg_resolution_days: f64,
}

impl OrderSummary {
    /// Orders whose status is completed or closed
    pub fn finished(&self) -> u64 {
        self.by_status
            .iter()
            .filter(|(status, _)| status.is_finished())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Field visit snapshot
#[derive(Debug, Clone, Serialize)]
pub struct VisitSummary {
    pub total: u64,
    pub by_status: KeyCounts<VisitStatus>,
    pub avg_resolution_days: f64,
}

impl VisitSummary {
    pub fn finished(&self) -> u64 {
        self.by_status
            .iter()
            .filter(|(status, _)| status.is_finished())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Quotation snapshot
#[derive(Debug, Clone, Serialize)]
pub struct QuotationSummary {
    pub total: u64,
    pub by_status: KeyCounts<QuotationStatus>,
    pub total_amount: f64,
    pub approved_amount: f64,
    pub avg_amount: f64,

    /// Approved share of all quotations in percent; null when there are none
    pub approval_rate: Option<f64>,
}

/// Computes per-entity summaries over already-fetched rows
pub struct EntityAggregator;

impl EntityAggregator {
    pub fn summarize_orders(orders: &[ServiceOrder]) -> OrderSummary {
        let active: Vec<&ServiceOrder> = orders.iter().filter(|o| o.is_active()).collect();

        OrderSummary {
            total: active.len() as u64,
            by_status: KeyCounts::tally(active.iter().map(|o| o.status)),
            by_priority: KeyCounts::tally(active.iter().map(|o| o.priority)),
            avg_resolution_days: average_resolution_days(
                active.iter().map(|o| (o.order_date, o.closed_at)),
            ),
        }
    }

    pub fn summarize_visits(visits: &[FieldVisit]) -> VisitSummary {
        let active: Vec<&FieldVisit> = visits.iter().filter(|v| v.is_active()).collect();

        VisitSummary {
            total: active.len() as u64,
            by_status: KeyCounts::tally(active.iter().map(|v| v.status)),
            avg_resolution_days: average_resolution_days(
                active.iter().map(|v| (v.created_at, v.closed_at)),
            ),
        }
    }

    pub fn summarize_quotations(quotations: &[Quotation]) -> QuotationSummary {
        let active: Vec<&Quotation> = quotations.iter().filter(|q| q.is_active()).collect();

        let by_status = KeyCounts::tally(active.iter().map(|q| q.status));
        let total = active.len() as u64;
        let total_amount: f64 = active.iter().map(|q| q.amount()).sum();
        let approved_amount: f64 = active
            .iter()
            .filter(|q| q.status == QuotationStatus::Approved)
            .map(|q| q.amount())
            .sum();
        let avg_amount = if total > 0 {
            total_amount / total as f64
        } else {
            0.0
        };

        QuotationSummary {
            total,
            approval_rate: ratio_pct(by_status.get(QuotationStatus::Approved), total),
            by_status,
            total_amount: round2(total_amount),
            approved_amount: round2(approved_amount),
            avg_amount: round2(avg_amount),
        }
    }

    /// Per-calendar-month counts across all three entities, most recent
    /// first, capped at `limit` months. Months are matched by calendar month
    /// only; records need not reference each other.
    pub fn monthly_evolution(
        bounds: DatePredicate,
        orders: &[ServiceOrder],
        visits: &[FieldVisit],
        quotations: &[Quotation],
        limit: usize,
    ) -> Vec<MonthBucket> {
        let mut accumulator = PeriodAccumulator::new(Granularity::Month, bounds);
        accumulator.add(orders);
        accumulator.add(visits);
        accumulator.add(quotations);

        accumulator
            .into_buckets(limit)
            .into_iter()
            .map(MonthBucket::from)
            .collect()
    }
}

/// Days between a reference date and closure; negative spans count as 0
pub fn resolution_days(reference: DateTime<Utc>, closed_at: DateTime<Utc>) -> f64 {
    let seconds = closed_at.signed_duration_since(reference).num_seconds().max(0);
    seconds as f64 / 86_400.0
}

fn average_resolution_days<I>(records: I) -> f64
where
    I: Iterator<Item = (DateTime<Utc>, Option<DateTime<Utc>>)>,
{
    let spans: Vec<f64> = records
        .filter_map(|(reference, closed_at)| closed_at.map(|closed| resolution_days(reference, closed)))
        .collect();
    round2(mean(&spans))
}
