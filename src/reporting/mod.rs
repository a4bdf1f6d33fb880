//! Maintenance reporting engine
//!
//! Read-only analytics over service orders, field visits and quotations.
//! Every operation normalizes its parameters first, then fetches rows for the
//! three entity types concurrently and aggregates them in application code.
//!
//! # Operations
//!
//! - **General summary**: per-entity status counts, resolution times,
//!   quotation amounts and a monthly evolution series
//! - **Performance metrics**: all-time headline figures, recent monthly
//!   productivity and current-vs-previous month trends
//! - **Activity report**: counts per day, ISO week or month over a date range
//! - **Export**: one module's rows as CSV or a JSON envelope
//!
//! # Example
//!
//! ```no_run
//! use maintenance_reports::reporting::{ReportParams, ReportingEngine};
//! use maintenance_reports::store::create_in_memory_store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ReportingEngine::with_defaults(create_in_memory_store());
//!
//!     let params = ReportParams::new()
//!         .with_dates("2024-01-01", "2024-03-31")
//!         .with_granularity("week");
//!
//!     let report = engine.activity_report(&params).await?;
//!     println!("{} periods", report.period_summary.period_count);
//!
//!     Ok(())
//! }
//! ```

mod aggregation;
mod buckets;
mod clock;
mod engine;
mod error;
mod export;
mod filter;
mod reports;
mod statistics;
mod trends;

pub use aggregation::{
    resolution_days, EntityAggregator, KeyCounts, OrderSummary, QuotationSummary, VisitSummary,
};
pub use buckets::{period_count, MonthBucket, Period, PeriodAccumulator, PeriodBucket};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::ReportingEngine;
pub use error::{ReportError, ReportResult};
pub use export::{
    ExportFormat, ExportMetadata, ExportPayload, ExportRecord, ExportRow, ExportSet,
    ReportExporter,
};
pub use filter::{ExportParams, ExportRequest, Granularity, ReportFilter, ReportParams};
pub use reports::{
    ActivityConfig, ActivityReport, GeneralMetrics, GeneralSummary, PerformanceReport,
    PeriodSummary,
};
pub use statistics::{mean, ratio_pct, round2, variation_pct};
pub use trends::{trend_for, TrendPoint};
