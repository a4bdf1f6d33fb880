use crate::api::AppState;
use crate::error::Result;
use crate::reporting::{
    ActivityReport, ExportParams, GeneralSummary, PerformanceReport, ReportParams,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// General summary over an optional date range
pub async fn general_summary(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<GeneralSummary>> {
    let summary = state.engine.general_summary(&params).await?;
    Ok(Json(summary))
}

/// All-time performance metrics
pub async fn performance_metrics(State(state): State<AppState>) -> Result<Json<PerformanceReport>> {
    let report = state.engine.performance_metrics().await?;
    Ok(Json(report))
}

/// Time-bucketed activity
pub async fn activity_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ActivityReport>> {
    let report = state.engine.activity_report(&params).await?;
    Ok(Json(report))
}

/// Download one module's rows as CSV or JSON
pub async fn export_report(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response> {
    let payload = state.engine.export(&params).await?;

    let disposition = format!("attachment; filename=\"{}\"", payload.filename);
    let mut response = payload.body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(payload.content_type),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
