//! Report response types

use crate::models::Module;
use crate::reporting::aggregation::{OrderSummary, QuotationSummary, VisitSummary};
use crate::reporting::buckets::{MonthBucket, PeriodBucket};
use crate::reporting::filter::Granularity;
use crate::reporting::statistics::round2;
use crate::reporting::trends::TrendPoint;
use chrono::NaiveDate;
use serde::Serialize;

/// General report: one summary per entity plus the monthly evolution
#[derive(Debug, Clone, Serialize)]
pub struct GeneralSummary {
    pub orders: OrderSummary,
    pub visits: VisitSummary,
    pub quotations: QuotationSummary,

    /// Most recent month first, at most 12 entries
    pub monthly_evolution: Vec<MonthBucket>,
}

/// All-time headline figures
#[derive(Debug, Clone, Serialize)]
pub struct GeneralMetrics {
    pub total_orders: u64,
    pub finished_orders: u64,
    pub order_completion_rate: Option<f64>,
    pub avg_order_resolution_days: f64,

    pub total_visits: u64,
    pub finished_visits: u64,
    pub visit_completion_rate: Option<f64>,
    pub avg_visit_resolution_days: f64,

    pub total_quotations: u64,
    pub approved_quotations: u64,
    pub quotation_approval_rate: Option<f64>,
    pub approved_amount: f64,
}

/// Performance metrics view
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub general_metrics: GeneralMetrics,

    /// Recent calendar months, most recent first
    pub monthly_productivity: Vec<MonthBucket>,

    /// Current month against the previous one, per entity
    pub trends: Vec<TrendPoint>,
}

/// Totals over the whole requested range of an activity report
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeriodSummary {
    pub total_orders: u64,
    pub total_visits: u64,
    pub total_quotations: u64,
    pub total_quotation_amount: f64,

    /// Periods in the full range, before truncation
    pub period_count: usize,

    /// Period with the highest total; the most recent wins ties
    pub busiest_period: Option<String>,
}

impl PeriodSummary {
    /// Summarize buckets ordered most recent first.
    ///
    /// `buckets` need only hold the periods that received records; empty
    /// periods add nothing to the totals and never win the busiest slot.
    pub fn from_buckets(buckets: &[PeriodBucket], period_count: usize) -> Self {
        let mut summary = Self {
            period_count,
            ..Self::default()
        };

        let mut busiest: Option<&PeriodBucket> = None;
        for bucket in buckets {
            summary.total_orders += bucket.orders;
            summary.total_visits += bucket.visits;
            summary.total_quotations += bucket.quotations;
            summary.total_quotation_amount += bucket.quotation_amount;

            if bucket.total > 0 && busiest.map_or(true, |best| bucket.total > best.total) {
                busiest = Some(bucket);
            }
        }

        summary.total_quotation_amount = round2(summary.total_quotation_amount);
        summary.busiest_period = busiest.map(|b| b.period.clone());
        summary
    }
}

/// Effective parameters of an activity report
#[derive(Debug, Clone, Serialize)]
pub struct ActivityConfig {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub granularity: Granularity,
    pub modules: Vec<Module>,
}

/// Activity report view
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    /// Most recent period first, at most 12 entries
    pub activity: Vec<PeriodBucket>,
    pub period_summary: PeriodSummary,
    pub config: ActivityConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(period: &str, orders: u64, amount: f64) -> PeriodBucket {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PeriodBucket {
            period: period.to_string(),
            start: day,
            end: day,
            orders,
            visits: 0,
            quotations: 1,
            quotation_amount: amount,
            total: orders + 1,
        }
    }

    #[test]
    fn test_period_summary_totals_and_busiest() {
        let buckets = vec![
            bucket("2024-03", 1, 10.1),
            bucket("2024-02", 4, 20.2),
            bucket("2024-01", 4, 0.0),
        ];
        let summary = PeriodSummary::from_buckets(&buckets, 3);

        assert_eq!(summary.total_orders, 9);
        assert_eq!(summary.total_quotations, 3);
        assert_eq!(summary.total_quotation_amount, 30.3);
        assert_eq!(summary.period_count, 3);
        assert_eq!(summary.busiest_period.as_deref(), Some("2024-02"));
    }

    #[test]
    fn test_empty_periods_have_no_busiest() {
        let mut empty = bucket("2024-01", 0, 0.0);
        empty.quotations = 0;
        empty.total = 0;
        let summary = PeriodSummary::from_buckets(&[empty], 1);
        assert_eq!(summary.busiest_period, None);
        assert_eq!(summary.period_count, 1);
    }

    #[test]
    fn test_period_count_is_independent_of_recorded_buckets() {
        let summary = PeriodSummary::from_buckets(&[bucket("2024-02", 2, 5.0)], 366);
        assert_eq!(summary.period_count, 366);
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.busiest_period.as_deref(), Some("2024-02"));
    }
}
