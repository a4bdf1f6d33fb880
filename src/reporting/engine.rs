//! Reporting engine: the four operations exposed to the transport layer

use crate::config::ReportingConfig;
use crate::models::{FieldVisit, Module, Quotation, QuotationStatus, ServiceOrder};
use crate::reporting::aggregation::EntityAggregator;
use crate::reporting::buckets::{MonthBucket, Period, PeriodAccumulator};
use crate::reporting::clock::{Clock, SystemClock};
use crate::reporting::error::{ReportError, ReportResult};
use crate::reporting::export::{ExportPayload, ExportRecord, ExportRow, ExportSet, ReportExporter};
use crate::reporting::filter::{ExportParams, ExportRequest, Granularity, ReportFilter, ReportParams};
use crate::reporting::reports::{
    ActivityConfig, ActivityReport, GeneralMetrics, GeneralSummary, PerformanceReport,
    PeriodSummary,
};
use crate::reporting::statistics::ratio_pct;
use crate::reporting::trends::trend_for;
use crate::store::{DatePredicate, Queryable, ReportStore, RowQuery, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Stateless, request-scoped reporting engine
pub struct ReportingEngine {
    store: Arc<dyn ReportStore>,
    clock: Arc<dyn Clock>,
    config: ReportingConfig,
}

impl ReportingEngine {
    /// Create a new reporting engine
    pub fn new(store: Arc<dyn ReportStore>, config: ReportingConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(store: Arc<dyn ReportStore>) -> Self {
        Self::new(store, ReportingConfig::default())
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Per-entity summaries and monthly evolution over an optional date range
    pub async fn general_summary(&self, params: &ReportParams) -> ReportResult<GeneralSummary> {
        const OPERATION: &str = "general_summary";

        let filter = ReportFilter::normalize(params)?;
        let query = RowQuery::newest_first(filter.predicate());

        let (orders, visits, quotations) = tokio::try_join!(
            self.fetch::<ServiceOrder>(&query, OPERATION),
            self.fetch::<FieldVisit>(&query, OPERATION),
            self.fetch::<Quotation>(&query, OPERATION),
        )?;

        let summary = GeneralSummary {
            orders: EntityAggregator::summarize_orders(&orders),
            visits: EntityAggregator::summarize_visits(&visits),
            quotations: EntityAggregator::summarize_quotations(&quotations),
            monthly_evolution: EntityAggregator::monthly_evolution(
                filter.predicate(),
                &orders,
                &visits,
                &quotations,
                self.config.max_evolution_months,
            ),
        };

        info!(
            date_from = ?filter.from,
            date_to = ?filter.to,
            orders = summary.orders.total,
            visits = summary.visits.total,
            quotations = summary.quotations.total,
            "General summary generated"
        );

        Ok(summary)
    }

    /// All-time headline metrics, recent monthly productivity and
    /// month-over-month trends
    pub async fn performance_metrics(&self) -> ReportResult<PerformanceReport> {
        const OPERATION: &str = "performance_metrics";

        let today = self.clock.today();
        let query = RowQuery::newest_first(DatePredicate::unbounded());

        let (orders, visits, quotations) = tokio::try_join!(
            self.fetch::<ServiceOrder>(&query, OPERATION),
            self.fetch::<FieldVisit>(&query, OPERATION),
            self.fetch::<Quotation>(&query, OPERATION),
        )?;

        let order_summary = EntityAggregator::summarize_orders(&orders);
        let visit_summary = EntityAggregator::summarize_visits(&visits);
        let quotation_summary = EntityAggregator::summarize_quotations(&quotations);
        let approved_quotations = quotation_summary.by_status.get(QuotationStatus::Approved);

        let general_metrics = GeneralMetrics {
            total_orders: order_summary.total,
            finished_orders: order_summary.finished(),
            order_completion_rate: ratio_pct(order_summary.finished(), order_summary.total),
            avg_order_resolution_days: order_summary.avg_resolution_days,
            total_visits: visit_summary.total,
            finished_visits: visit_summary.finished(),
            visit_completion_rate: ratio_pct(visit_summary.finished(), visit_summary.total),
            avg_visit_resolution_days: visit_summary.avg_resolution_days,
            total_quotations: quotation_summary.total,
            approved_quotations,
            quotation_approval_rate: quotation_summary.approval_rate,
            approved_amount: quotation_summary.approved_amount,
        };

        // The window always reaches back at least one month so the trend has
        // a previous period to compare with
        let months = self.config.productivity_months.max(1);
        let current_month = Period::containing(today, Granularity::Month);
        let first_month = (1..months).fold(current_month, |period, _| {
            period.previous().unwrap_or(period)
        });
        let trend_start = current_month.previous().unwrap_or(current_month);
        let window = DatePredicate::between(Some(first_month.min(trend_start).start()), Some(today));

        let mut accumulator = PeriodAccumulator::new(Granularity::Month, window);
        accumulator.add(&orders);
        accumulator.add(&visits);
        accumulator.add(&quotations);

        let trends = Module::iter()
            .filter_map(|module| {
                trend_for(module, current_month, |period| accumulator.count(module, period))
            })
            .collect();

        let monthly_productivity = accumulator
            .into_buckets(months)
            .into_iter()
            .map(MonthBucket::from)
            .collect();

        info!(
            total_orders = general_metrics.total_orders,
            total_visits = general_metrics.total_visits,
            total_quotations = general_metrics.total_quotations,
            "Performance metrics generated"
        );

        Ok(PerformanceReport {
            general_metrics,
            monthly_productivity,
            trends,
        })
    }

    /// Time-bucketed activity for the selected modules
    pub async fn activity_report(&self, params: &ReportParams) -> ReportResult<ActivityReport> {
        const OPERATION: &str = "activity_report";

        let today = self.clock.today();
        let filter = ReportFilter::normalize(params)?
            .with_default_bounds(self.config.activity_default_from, today)?;
        let query = RowQuery::newest_first(filter.predicate());

        let (orders, visits, quotations) = tokio::try_join!(
            self.fetch_selected::<ServiceOrder>(&filter, &query, OPERATION),
            self.fetch_selected::<FieldVisit>(&filter, &query, OPERATION),
            self.fetch_selected::<Quotation>(&filter, &query, OPERATION),
        )?;

        let mut accumulator = PeriodAccumulator::new(filter.granularity, filter.predicate());
        accumulator.add(&orders);
        accumulator.add(&visits);
        accumulator.add(&quotations);

        // Totals come from the recorded periods; only the returned window is gap-filled
        let period_summary =
            PeriodSummary::from_buckets(&accumulator.recorded_buckets(), accumulator.period_count());
        let activity = accumulator.into_buckets(self.config.max_activity_buckets);

        let config = ActivityConfig {
            date_from: filter.from.unwrap_or(self.config.activity_default_from),
            date_to: filter.to.unwrap_or(today),
            granularity: filter.granularity,
            modules: filter.modules.iter().copied().collect(),
        };

        info!(
            date_from = %config.date_from,
            date_to = %config.date_to,
            granularity = %config.granularity,
            periods = period_summary.period_count,
            "Activity report generated"
        );

        Ok(ActivityReport {
            activity,
            period_summary,
            config,
        })
    }

    /// Export one module's rows as CSV or a JSON envelope
    pub async fn export(&self, params: &ExportParams) -> ReportResult<ExportPayload> {
        let request = ExportRequest::normalize(params)?;
        let now = self.clock.now();

        let rows = match request.module {
            Module::Orders => self.export_rows::<ServiceOrder>(&request.filter, now).await?,
            Module::Visits => self.export_rows::<FieldVisit>(&request.filter, now).await?,
            Module::Quotations => self.export_rows::<Quotation>(&request.filter, now).await?,
        };

        if rows.is_empty() {
            return Err(ReportError::NoDataToExport {
                module: request.module,
            });
        }

        let set = ExportSet::new(request.module, rows, request.format, now);
        let payload = ReportExporter::render(
            &set,
            request.format,
            request.filter.from,
            request.filter.to,
            now,
        )?;

        info!(
            module = %request.module,
            format = %request.format,
            records = payload.record_count,
            filename = %payload.filename,
            "Export generated"
        );

        Ok(payload)
    }

    async fn export_rows<R: Queryable + ExportRecord>(
        &self,
        filter: &ReportFilter,
        now: DateTime<Utc>,
    ) -> ReportResult<Vec<ExportRow>> {
        let query = RowQuery::newest_first(filter.predicate());
        let records = self.fetch::<R>(&query, "export").await?;
        let needle = filter.search_needle();

        Ok(records
            .iter()
            .filter(|record| needle.as_deref().map_or(true, |n| record.matches_text(n)))
            .map(|record| record.to_export_row(now))
            .collect())
    }

    /// Run one row query under the configured deadline
    async fn fetch<R: Queryable>(
        &self,
        query: &RowQuery,
        operation: &'static str,
    ) -> ReportResult<Vec<R>> {
        let deadline = self.config.query_timeout();

        let result = match timeout(deadline, R::fetch(self.store.as_ref(), query)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout { after: deadline }),
        };

        match result {
            Ok(rows) => {
                debug!(module = %R::MODULE, operation, rows = rows.len(), "Rows fetched");
                Ok(rows)
            }
            Err(source) => {
                error!(
                    module = %R::MODULE,
                    operation,
                    error = %source,
                    "Data source query failed"
                );
                Err(ReportError::DataSource {
                    module: R::MODULE,
                    operation,
                    source,
                })
            }
        }
    }

    async fn fetch_selected<R: Queryable>(
        &self,
        filter: &ReportFilter,
        query: &RowQuery,
        operation: &'static str,
    ) -> ReportResult<Vec<R>> {
        if !filter.includes(R::MODULE) {
            return Ok(Vec::new());
        }
        self.fetch(query, operation).await
    }
}
