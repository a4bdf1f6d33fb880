//! Time bucketing for activity and evolution series

use crate::models::{Module, OperationalRecord};
use crate::reporting::filter::Granularity;
use crate::reporting::statistics::round2;
use crate::store::DatePredicate;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One calendar unit (day, ISO week, or month), identified by its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    start: NaiveDate,
    granularity: Granularity,
}

impl Period {
    /// The period of the given granularity that contains `date`
    pub fn containing(date: NaiveDate, granularity: Granularity) -> Self {
        let start = match granularity {
            Granularity::Day => date,
            Granularity::Week => date
                .checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
                .unwrap_or(date),
            Granularity::Month => date.with_day(1).unwrap_or(date),
        };
        Self { start, granularity }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the period (inclusive)
    pub fn end(&self) -> NaiveDate {
        match self.granularity {
            Granularity::Day => self.start,
            Granularity::Week => self
                .start
                .checked_add_days(Days::new(6))
                .unwrap_or(NaiveDate::MAX),
            Granularity::Month => self
                .start
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn next(&self) -> Option<Self> {
        let start = match self.granularity {
            Granularity::Day => self.start.checked_add_days(Days::new(1)),
            Granularity::Week => self.start.checked_add_days(Days::new(7)),
            Granularity::Month => self.start.checked_add_months(Months::new(1)),
        }?;
        Some(Self { start, ..*self })
    }

    pub fn previous(&self) -> Option<Self> {
        let start = match self.granularity {
            Granularity::Day => self.start.checked_sub_days(Days::new(1)),
            Granularity::Week => self.start.checked_sub_days(Days::new(7)),
            Granularity::Month => self.start.checked_sub_months(Months::new(1)),
        }?;
        Some(Self { start, ..*self })
    }

    /// Canonical label: `YYYY-MM-DD`, `YYYY-Www` (ISO week) or `YYYY-MM`
    pub fn key(&self) -> String {
        match self.granularity {
            Granularity::Day => self.start.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let week = self.start.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Granularity::Month => self.start.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Number of periods touching the inclusive range `[from, to]`, counted
/// without walking the calendar. Zero when `from > to`.
pub fn period_count(from: NaiveDate, to: NaiveDate, granularity: Granularity) -> usize {
    if from > to {
        return 0;
    }

    let count = match granularity {
        Granularity::Day => (to - from).num_days() + 1,
        Granularity::Week => {
            let first = Period::containing(from, granularity).start();
            let last = Period::containing(to, granularity).start();
            (last - first).num_days() / 7 + 1
        }
        Granularity::Month => {
            let months = |date: NaiveDate| date.year() as i64 * 12 + date.month0() as i64;
            months(to) - months(from) + 1
        }
    };

    usize::try_from(count).unwrap_or(0)
}

/// Aggregate row for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    /// Canonical period label
    pub period: String,

    /// First day covered, clipped to the requested range
    pub start: NaiveDate,

    /// Last day covered, clipped to the requested range
    pub end: NaiveDate,

    pub orders: u64,
    pub visits: u64,
    pub quotations: u64,
    pub quotation_amount: f64,

    /// Sum of the per-module counts
    pub total: u64,
}

/// Per-calendar-month counts used by the summary and productivity views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// `YYYY-MM`
    pub month: String,
    pub orders: u64,
    pub visits: u64,
    pub quotations: u64,
    pub quotation_amount: f64,
}

impl From<PeriodBucket> for MonthBucket {
    fn from(bucket: PeriodBucket) -> Self {
        Self {
            month: bucket.period,
            orders: bucket.orders,
            visits: bucket.visits,
            quotations: bucket.quotations,
            quotation_amount: bucket.quotation_amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PeriodTally {
    orders: u64,
    visits: u64,
    quotations: u64,
    quotation_amount: f64,
}

impl PeriodTally {
    fn record(&mut self, module: Module, amount: f64) {
        match module {
            Module::Orders => self.orders += 1,
            Module::Visits => self.visits += 1,
            Module::Quotations => {
                self.quotations += 1;
                self.quotation_amount += amount;
            }
        }
    }

    fn count(&self, module: Module) -> u64 {
        match module {
            Module::Orders => self.orders,
            Module::Visits => self.visits,
            Module::Quotations => self.quotations,
        }
    }
}

/// Groups records into periods of one granularity.
///
/// Only periods that received a record are stored. When both bounds are
/// present, [`into_buckets`](Self::into_buckets) fills the empty periods of
/// the window it returns, so the output has no gaps without materializing the
/// whole range. With an open bound only periods that received a record are
/// emitted. Periods are keyed by start date, which is unique per granularity,
/// so ordering is total and repeatable.
#[derive(Debug, Clone)]
pub struct PeriodAccumulator {
    granularity: Granularity,
    bounds: DatePredicate,
    tallies: BTreeMap<Period, PeriodTally>,
}

impl PeriodAccumulator {
    pub fn new(granularity: Granularity, bounds: DatePredicate) -> Self {
        Self {
            granularity,
            bounds,
            tallies: BTreeMap::new(),
        }
    }

    /// Count active records that fall inside the bounds
    pub fn add<R: OperationalRecord>(&mut self, rows: &[R]) {
        let bounds = self.bounds;
        for row in rows.iter().filter(|row| bounds.matches_record(*row)) {
            let period = Period::containing(row.reference_date().date_naive(), self.granularity);
            self.tallies
                .entry(period)
                .or_default()
                .record(R::MODULE, row.monetary_amount());
        }
    }

    /// Records of `module` in `period`.
    ///
    /// An empty period inside a closed range counts as zero. Outside the
    /// range, or with an open bound, a period without records is `None`.
    pub fn count(&self, module: Module, period: Period) -> Option<u64> {
        if let Some(tally) = self.tallies.get(&period) {
            return Some(tally.count(module));
        }

        match (self.bounds.from, self.bounds.to) {
            (Some(from), Some(to)) if period.start() <= to && period.end() >= from => Some(0),
            _ => None,
        }
    }

    /// Periods the output covers: the whole closed range, or the periods
    /// that received a record when a bound is open
    pub fn period_count(&self) -> usize {
        match (self.bounds.from, self.bounds.to) {
            (Some(from), Some(to)) => period_count(from, to, self.granularity),
            _ => self.tallies.len(),
        }
    }

    /// Buckets for every period that received a record, most recent first
    pub fn recorded_buckets(&self) -> Vec<PeriodBucket> {
        self.tallies
            .iter()
            .rev()
            .map(|(period, tally)| self.bucket(*period, tally))
            .collect()
    }

    /// The `limit` most recent buckets, most recent first.
    ///
    /// With both bounds set the walk starts at the period containing `to`
    /// and stops at the one containing `from`, emitting zeroed buckets for
    /// periods without records.
    pub fn into_buckets(self, limit: usize) -> Vec<PeriodBucket> {
        let (from, to) = match (self.bounds.from, self.bounds.to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return self
                    .tallies
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|(period, tally)| self.bucket(*period, tally))
                    .collect();
            }
        };

        let mut buckets = Vec::new();
        if from > to {
            return buckets;
        }

        let empty = PeriodTally::default();
        let mut cursor = Some(Period::containing(to, self.granularity));
        while let Some(period) = cursor {
            if buckets.len() >= limit || period.end() < from {
                break;
            }
            let tally = self.tallies.get(&period).unwrap_or(&empty);
            buckets.push(self.bucket(period, tally));
            cursor = period.previous();
        }

        buckets
    }

    fn bucket(&self, period: Period, tally: &PeriodTally) -> PeriodBucket {
        let start = match self.bounds.from {
            Some(from) => period.start().max(from),
            None => period.start(),
        };
        let end = match self.bounds.to {
            Some(to) => period.end().min(to),
            None => period.end(),
        };

        PeriodBucket {
            period: period.key(),
            start,
            end,
            orders: tally.orders,
            visits: tally.visits,
            quotations: tally.quotations,
            quotation_amount: round2(tally.quotation_amount),
            total: tally.orders + tally.visits + tally.quotations,
        }
    }
}
