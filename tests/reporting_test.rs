//! End-to-end tests for the reporting engine over the in-memory store

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use maintenance_reports::models::{
    FieldVisit, Module, OrderStatus, Priority, Quotation, QuotationStatus, ServiceOrder,
    VisitStatus,
};
use maintenance_reports::reporting::*;
use maintenance_reports::store::{
    InMemoryStore, ReportStore, RowQuery, StoreError, StoreResult,
};
use std::sync::Arc;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
}

fn order(id: i64, date: DateTime<Utc>, status: OrderStatus) -> ServiceOrder {
    ServiceOrder {
        id,
        code: format!("OS-{:04}", id),
        client: "Clinica San Rafael".to_string(),
        equipment: "Infusion pump".to_string(),
        description: "Preventive maintenance".to_string(),
        status,
        priority: Priority::Medium,
        order_date: date,
        closed_at: None,
        active: true,
    }
}

fn visit(id: i64, date: DateTime<Utc>, status: VisitStatus) -> FieldVisit {
    FieldVisit {
        id,
        code: format!("VT-{:04}", id),
        client: "Hospital del Norte".to_string(),
        technician: "R. Medina".to_string(),
        status,
        created_at: date,
        closed_at: None,
        active: true,
    }
}

fn quotation(id: i64, date: DateTime<Utc>, status: QuotationStatus, amount: f64) -> Quotation {
    Quotation {
        id,
        code: format!("COT-{:04}", id),
        client: "Laboratorio Central".to_string(),
        description: "Spare parts".to_string(),
        status,
        amount,
        created_at: date,
        active: true,
    }
}

fn engine_at(store: InMemoryStore, now: DateTime<Utc>) -> ReportingEngine {
    ReportingEngine::with_defaults(Arc::new(store)).with_clock(Arc::new(FixedClock(now)))
}

/// Store whose visit queries always fail
struct BrokenVisits(InMemoryStore);

#[async_trait]
impl ReportStore for BrokenVisits {
    async fn orders(&self, query: &RowQuery) -> StoreResult<Vec<ServiceOrder>> {
        self.0.orders(query).await
    }

    async fn visits(&self, _query: &RowQuery) -> StoreResult<Vec<FieldVisit>> {
        Err(StoreError::Query(
            "relation \"visitas\" does not exist".to_string(),
        ))
    }

    async fn quotations(&self, query: &RowQuery) -> StoreResult<Vec<Quotation>> {
        self.0.quotations(query).await
    }
}

#[tokio::test]
async fn test_daily_activity_is_gap_filled() {
    let store = InMemoryStore::new();
    store.insert_order(order(1, at(2024, 1, 2), OrderStatus::Pending));

    let report = engine_at(store, at(2024, 6, 1))
        .activity_report(
            &ReportParams::new()
                .with_dates("2024-01-01", "2024-01-03")
                .with_granularity("day")
                .with_module("orders"),
        )
        .await
        .unwrap();

    let labels: Vec<&str> = report.activity.iter().map(|b| b.period.as_str()).collect();
    assert_eq!(labels, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
    assert_eq!(report.activity[0].total, 0);
    assert_eq!(report.activity[1].total, 1);
    assert_eq!(report.activity[1].orders, 1);
    assert_eq!(report.activity[2].total, 0);

    assert_eq!(report.period_summary.total_orders, 1);
    assert_eq!(report.period_summary.busiest_period.as_deref(), Some("2024-01-02"));
    assert_eq!(report.config.modules, vec![Module::Orders]);
    assert_eq!(report.config.granularity, Granularity::Day);
}

#[tokio::test]
async fn test_activity_excludes_unselected_modules() {
    let store = InMemoryStore::new();
    store.insert_order(order(1, at(2024, 1, 2), OrderStatus::Pending));
    store.insert_visit(visit(1, at(2024, 1, 2), VisitStatus::Scheduled));

    let report = engine_at(store, at(2024, 6, 1))
        .activity_report(
            &ReportParams::new()
                .with_dates("2024-01-01", "2024-01-31")
                .with_granularity("month")
                .with_module("visits"),
        )
        .await
        .unwrap();

    assert_eq!(report.activity.len(), 1);
    assert_eq!(report.activity[0].visits, 1);
    assert_eq!(report.activity[0].orders, 0);
}

#[tokio::test]
async fn test_activity_truncates_to_most_recent_periods() {
    let store = InMemoryStore::new();
    store.insert_order(order(1, at(2024, 1, 10), OrderStatus::Pending));

    let report = engine_at(store, at(2024, 12, 1))
        .activity_report(
            &ReportParams::new()
                .with_dates("2024-01-01", "2024-12-31")
                .with_granularity("week"),
        )
        .await
        .unwrap();

    assert_eq!(report.activity.len(), 12);
    assert_eq!(report.activity[0].period, "2025-W01");
    assert_eq!(report.period_summary.period_count, 53);
    assert_eq!(report.period_summary.total_orders, 1);
    assert_eq!(report.period_summary.busiest_period.as_deref(), Some("2024-W02"));
}

#[tokio::test]
async fn test_activity_over_the_whole_calendar_stays_bounded() {
    let store = InMemoryStore::new();
    store.insert_order(order(1, at(2024, 5, 2), OrderStatus::Pending));
    store.insert_quotation(quotation(1, at(2024, 5, 2), QuotationStatus::Sent, 80.5));
    store.insert_visit(visit(1, at(9999, 12, 31), VisitStatus::Scheduled));

    let report = engine_at(store, at(2024, 6, 1))
        .activity_report(
            &ReportParams::new()
                .with_dates("0001-01-01", "9999-12-31")
                .with_granularity("day"),
        )
        .await
        .unwrap();

    assert_eq!(report.activity.len(), 12);
    assert_eq!(report.activity[0].period, "9999-12-31");
    assert_eq!(report.activity[0].visits, 1);
    assert_eq!(report.activity[11].period, "9999-12-20");

    let summary = &report.period_summary;
    assert_eq!(summary.period_count, 3_652_059);
    assert_eq!(summary.total_orders, 1);
    assert_eq!(summary.total_visits, 1);
    assert_eq!(summary.total_quotations, 1);
    assert_eq!(summary.total_quotation_amount, 80.5);
    assert_eq!(summary.busiest_period.as_deref(), Some("2024-05-02"));
}

#[tokio::test]
async fn test_general_summary_over_empty_store() {
    let summary = engine_at(InMemoryStore::new(), at(2024, 6, 1))
        .general_summary(&ReportParams::new())
        .await
        .unwrap();

    assert_eq!(summary.orders.total, 0);
    assert_eq!(summary.visits.total, 0);
    assert_eq!(summary.quotations.total, 0);
    assert!(summary.monthly_evolution.is_empty());
    assert_eq!(summary.quotations.approval_rate, None);

    // Every status key is present even with no rows
    let json = serde_json::to_value(&summary).unwrap();
    let statuses = json["visits"]["by_status"].as_object().unwrap();
    assert_eq!(statuses.len(), 6);
    assert!(statuses.values().all(|count| count == 0));
}

#[tokio::test]
async fn test_approval_rate_and_amounts() {
    let store = InMemoryStore::new();
    for id in 0..10 {
        let status = if id < 3 {
            QuotationStatus::Approved
        } else {
            QuotationStatus::Sent
        };
        store.insert_quotation(quotation(id, at(2024, 2, 1), status, 100.0));
    }

    let summary = engine_at(store, at(2024, 6, 1))
        .general_summary(&ReportParams::new())
        .await
        .unwrap();

    assert_eq!(summary.quotations.total, 10);
    assert_eq!(summary.quotations.approval_rate, Some(30.0));
    assert_eq!(summary.quotations.total_amount, 1000.0);
    assert_eq!(summary.quotations.approved_amount, 300.0);
    assert_eq!(summary.monthly_evolution.len(), 1);
    assert_eq!(summary.monthly_evolution[0].month, "2024-02");
    assert_eq!(summary.monthly_evolution[0].quotation_amount, 1000.0);
}

#[tokio::test]
async fn test_inactive_rows_are_ignored() {
    let store = InMemoryStore::new();
    let mut retired = order(1, at(2024, 2, 1), OrderStatus::Completed);
    retired.active = false;
    store.insert_order(retired);
    store.insert_order(order(2, at(2024, 2, 1), OrderStatus::Pending));

    let summary = engine_at(store, at(2024, 6, 1))
        .general_summary(&ReportParams::new())
        .await
        .unwrap();

    assert_eq!(summary.orders.total, 1);
    assert_eq!(summary.orders.by_status.get(OrderStatus::Pending), 1);
    assert_eq!(summary.orders.by_status.get(OrderStatus::Completed), 0);
}

#[tokio::test]
async fn test_trend_with_empty_previous_month() {
    let store = InMemoryStore::new();
    for id in 0..5 {
        store.insert_order(order(id, at(2024, 3, 2), OrderStatus::InProgress));
    }

    let report = engine_at(store, at(2024, 3, 15))
        .performance_metrics()
        .await
        .unwrap();

    let orders = report
        .trends
        .iter()
        .find(|t| t.module == Module::Orders)
        .unwrap();
    assert_eq!(orders.period, "2024-03");
    assert_eq!(orders.current_total, 5);
    assert_eq!(orders.previous_total, Some(0));
    assert_eq!(orders.variation_pct, None);

    assert_eq!(report.trends.len(), 3);
    assert_eq!(report.monthly_productivity.len(), 6);
    assert_eq!(report.monthly_productivity[0].month, "2024-03");
    assert_eq!(report.monthly_productivity[5].month, "2023-10");
    assert_eq!(report.general_metrics.total_orders, 5);
    assert_eq!(report.general_metrics.order_completion_rate, Some(0.0));
    assert_eq!(report.general_metrics.visit_completion_rate, None);
}

#[tokio::test]
async fn test_trend_across_year_boundary() {
    let store = InMemoryStore::new();
    for id in 0..4 {
        store.insert_visit(visit(id, at(2023, 12, 5), VisitStatus::Completed));
    }
    for id in 4..10 {
        store.insert_visit(visit(id, at(2024, 1, 8), VisitStatus::Scheduled));
    }

    let report = engine_at(store, at(2024, 1, 20))
        .performance_metrics()
        .await
        .unwrap();

    let visits = report
        .trends
        .iter()
        .find(|t| t.module == Module::Visits)
        .unwrap();
    assert_eq!(visits.current_total, 6);
    assert_eq!(visits.previous_total, Some(4));
    assert_eq!(visits.variation_pct, Some(50.0));
    assert_eq!(report.general_metrics.finished_visits, 4);
    assert_eq!(report.general_metrics.visit_completion_rate, Some(40.0));
}

#[tokio::test]
async fn test_csv_export_quotes_embedded_separators() {
    let store = InMemoryStore::new();
    let mut quoted = quotation(1, at(2024, 1, 15), QuotationStatus::Sent, 120.5);
    quoted.description = "He said, \"ok\"".to_string();
    store.insert_quotation(quoted);

    let payload = engine_at(store, at(2024, 2, 1))
        .export(&ExportParams {
            format: Some("csv".to_string()),
            module: Some("quotations".to_string()),
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("2024-01-31".to_string()),
            search: None,
        })
        .await
        .unwrap();

    let body = String::from_utf8(payload.body).unwrap();
    assert!(body.contains(r#""He said, ""ok""""#));
    assert_eq!(payload.filename, "quotations_report_20240201.csv");
    assert_eq!(payload.content_type, "text/csv; charset=utf-8");
    assert_eq!(payload.record_count, 1);
}

#[tokio::test]
async fn test_csv_export_parses_back_to_the_same_values() {
    let descriptions = [
        "plain",
        "comma, inside",
        "quote \" inside",
        "line\nbreak",
        "all, of \"them\"\r\n",
    ];

    let store = InMemoryStore::new();
    for (id, description) in descriptions.iter().enumerate() {
        let mut order = order(id as i64, at(2024, 1, 1 + id as u32), OrderStatus::Pending);
        order.description = description.to_string();
        store.insert_order(order);
    }

    let payload = engine_at(store, at(2024, 2, 1))
        .export(&ExportParams {
            module: Some("orders".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut reader = csv::Reader::from_reader(payload.body.as_slice());
    let headers = reader.headers().unwrap().clone();
    let description_col = headers.iter().position(|h| h == "description").unwrap();

    let parsed: Vec<String> = reader
        .records()
        .map(|record| record.unwrap()[description_col].to_string())
        .collect();

    // Rows are newest first
    let expected: Vec<String> = descriptions.iter().rev().map(|d| d.to_string()).collect();
    assert_eq!(parsed, expected);
}

#[tokio::test]
async fn test_json_export_envelope() {
    let store = InMemoryStore::new();
    store.insert_visit(visit(7, at(2024, 1, 10), VisitStatus::Completed));

    let payload = engine_at(store, at(2024, 2, 1))
        .export(&ExportParams {
            format: Some("JSON".to_string()),
            module: Some("visits".to_string()),
            date_from: Some("2024-01-01".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(payload.filename, "visits_report_20240201.json");
    let body: serde_json::Value = serde_json::from_slice(&payload.body).unwrap();
    assert_eq!(body["metadata"]["record_count"], 1);
    assert_eq!(body["metadata"]["module"], "visits");
    assert_eq!(body["metadata"]["date_from"], "2024-01-01");
    assert!(body["metadata"]["date_to"].is_null());
    assert_eq!(body["rows"][0]["code"], "VT-0007");
    assert_eq!(body["rows"][0]["elapsed_days"], 22);
}

#[tokio::test]
async fn test_export_search_filters_rows() {
    let store = InMemoryStore::new();
    store.insert_order(order(1, at(2024, 1, 5), OrderStatus::Pending));
    let mut other = order(2, at(2024, 1, 6), OrderStatus::Pending);
    other.client = "Hospital Regional".to_string();
    store.insert_order(other);

    let engine = engine_at(store, at(2024, 2, 1));
    let payload = engine
        .export(&ExportParams {
            format: Some("json".to_string()),
            module: Some("orders".to_string()),
            search: Some("  HOSPITAL ".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(payload.record_count, 1);

    let result = engine
        .export(&ExportParams {
            module: Some("orders".to_string()),
            search: Some("no such client".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        result,
        Err(ReportError::NoDataToExport {
            module: Module::Orders
        })
    ));
}

#[tokio::test]
async fn test_export_is_deterministic_under_fixed_clock() {
    let store = InMemoryStore::new();
    store.insert_order(order(1, at(2024, 1, 5), OrderStatus::Pending));
    store.insert_order(order(2, at(2024, 1, 5), OrderStatus::Closed));
    let engine = engine_at(store, at(2024, 2, 1));

    let params = ExportParams {
        format: Some("json".to_string()),
        module: Some("orders".to_string()),
        ..Default::default()
    };
    let first = engine.export(&params).await.unwrap();
    let second = engine.export(&params).await.unwrap();
    assert_eq!(first.body, second.body);
    assert_eq!(first.filename, second.filename);
}

#[tokio::test]
async fn test_export_requires_single_module() {
    let engine = engine_at(InMemoryStore::new(), at(2024, 2, 1));

    for module in [None, Some("all"), Some("equipment")] {
        let result = engine
            .export(&ExportParams {
                module: module.map(str::to_string),
                ..Default::default()
            })
            .await;
        match result {
            Err(err @ ReportError::InvalidEnum { .. }) => {
                assert_eq!(err.field(), Some("module"));
                assert!(err.is_client_error());
            }
            other => panic!("expected InvalidEnum, got {:?}", other.map(|p| p.filename)),
        }
    }
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let engine = engine_at(InMemoryStore::new(), at(2024, 2, 1));

    let err = engine
        .activity_report(&ReportParams::new().with_granularity("quarter"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "INVALID_ENUM");
    assert!(err.to_string().contains("day, week, month"));

    let err = engine
        .general_summary(&ReportParams::new().with_dates("2024-02-30", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "INVALID_DATE");
    assert_eq!(err.field(), Some("date_from"));

    let err = engine
        .activity_report(&ReportParams::new().with_dates("2024-05-01", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "INVALID_RANGE");
}

#[tokio::test]
async fn test_one_failing_module_fails_the_whole_report() {
    let inner = InMemoryStore::new();
    inner.insert_order(order(1, at(2024, 1, 5), OrderStatus::Pending));
    let engine = ReportingEngine::with_defaults(Arc::new(BrokenVisits(inner)))
        .with_clock(Arc::new(FixedClock(at(2024, 2, 1))));

    let err = engine
        .general_summary(&ReportParams::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "DATA_SOURCE_ERROR");
    assert!(!err.is_client_error());
    assert!(!err.to_string().contains("visitas"));
    assert!(err.to_string().contains("visits"));

    // Orders alone never touch the broken table
    let report = engine
        .activity_report(&ReportParams::new().with_module("orders"))
        .await
        .unwrap();
    assert_eq!(report.period_summary.total_orders, 1);
}
