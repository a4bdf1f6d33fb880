//! Export formats and row serialization

use crate::models::{FieldVisit, Module, OperationalRecord, Quotation, ServiceOrder};
use crate::reporting::error::{ReportError, ReportResult};
use crate::reporting::statistics::round2;
use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use strum::{AsRefStr, Display, EnumIter, EnumString};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Export format for row sets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub const NAMES: &'static [&'static str] = &["csv", "json"];

    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// One flat record with named fields in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRow {
    fields: Vec<(&'static str, Value)>,
}

impl ExportRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

impl Serialize for ExportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Records that can be flattened into an export row
pub trait ExportRecord: OperationalRecord {
    /// `now` stands in for a missing closure when computing elapsed days
    fn to_export_row(&self, now: DateTime<Utc>) -> ExportRow;
}

fn timestamp(value: DateTime<Utc>) -> Value {
    Value::String(value.format(TIMESTAMP_FORMAT).to_string())
}

fn optional_timestamp(value: Option<DateTime<Utc>>) -> Value {
    value.map(timestamp).unwrap_or(Value::Null)
}

/// Whole days from `start` to `closed_at`, or to `now` while still open
fn elapsed_days(start: DateTime<Utc>, closed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    closed_at
        .unwrap_or(now)
        .signed_duration_since(start)
        .num_days()
        .max(0)
}

impl ExportRecord for ServiceOrder {
    fn to_export_row(&self, now: DateTime<Utc>) -> ExportRow {
        ExportRow::new()
            .field("id", self.id)
            .field("code", self.code.clone())
            .field("client", self.client.clone())
            .field("equipment", self.equipment.clone())
            .field("description", self.description.clone())
            .field("status", self.status.to_string())
            .field("priority", self.priority.to_string())
            .field("order_date", timestamp(self.order_date))
            .field("closed_at", optional_timestamp(self.closed_at))
            .field("elapsed_days", elapsed_days(self.order_date, self.closed_at, now))
    }
}

impl ExportRecord for FieldVisit {
    fn to_export_row(&self, now: DateTime<Utc>) -> ExportRow {
        ExportRow::new()
            .field("id", self.id)
            .field("code", self.code.clone())
            .field("client", self.client.clone())
            .field("technician", self.technician.clone())
            .field("status", self.status.to_string())
            .field("created_at", timestamp(self.created_at))
            .field("closed_at", optional_timestamp(self.closed_at))
            .field("elapsed_days", elapsed_days(self.created_at, self.closed_at, now))
    }
}

impl ExportRecord for Quotation {
    fn to_export_row(&self, _now: DateTime<Utc>) -> ExportRow {
        ExportRow::new()
            .field("id", self.id)
            .field("code", self.code.clone())
            .field("client", self.client.clone())
            .field("description", self.description.clone())
            .field("status", self.status.to_string())
            .field("amount", round2(self.amount()))
            .field("created_at", timestamp(self.created_at))
    }
}

/// A materialized, ordered row set ready for serialization
#[derive(Debug, Clone, Serialize)]
pub struct ExportSet {
    pub module: Module,
    pub rows: Vec<ExportRow>,
    pub filename: String,
    pub record_count: usize,
}

impl ExportSet {
    pub fn new(module: Module, rows: Vec<ExportRow>, format: ExportFormat, generated_at: DateTime<Utc>) -> Self {
        let filename = format!(
            "{}_report_{}.{}",
            module,
            generated_at.format("%Y%m%d"),
            format.extension()
        );
        Self {
            module,
            record_count: rows.len(),
            rows,
            filename,
        }
    }
}

/// Metadata block of the JSON export envelope
#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    pub record_count: usize,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub module: Module,
    pub generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    rows: &'a [ExportRow],
    metadata: ExportMetadata,
}

/// Serialized export, ready to hand to the transport layer
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub record_count: usize,
}

/// Row-set exporter
pub struct ReportExporter;

impl ReportExporter {
    /// Render a row set in the requested format
    pub fn render(
        set: &ExportSet,
        format: ExportFormat,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        generated_at: DateTime<Utc>,
    ) -> ReportResult<ExportPayload> {
        let body = match format {
            ExportFormat::Csv => Self::to_csv(&set.rows).into_bytes(),
            ExportFormat::Json => {
                let envelope = ExportEnvelope {
                    rows: &set.rows,
                    metadata: ExportMetadata {
                        record_count: set.record_count,
                        date_from,
                        date_to,
                        module: set.module,
                        generated_at,
                    },
                };
                serde_json::to_vec_pretty(&envelope).map_err(ReportError::Encoding)?
            }
        };

        Ok(ExportPayload {
            filename: set.filename.clone(),
            content_type: format.mime_type(),
            body,
            record_count: set.record_count,
        })
    }

    /// Render rows as CSV: a header from the first row's keys, then one line
    /// per row, joined with `\n` and no trailing newline
    pub fn to_csv(rows: &[ExportRow]) -> String {
        let Some(first) = rows.first() else {
            return String::new();
        };

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(
            first
                .keys()
                .map(Self::escape_csv)
                .collect::<Vec<_>>()
                .join(","),
        );

        for row in rows {
            let line = row
                .values()
                .map(|value| Self::escape_csv(&Self::csv_text(value)).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            lines.push(line);
        }

        lines.join("\n")
    }

    /// Quote a field when it contains a comma, quote, or line break,
    /// doubling any embedded quotes
    pub fn escape_csv(field: &str) -> Cow<'_, str> {
        if field.contains([',', '"', '\n', '\r']) {
            Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(field)
        }
    }

    fn csv_text(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        }
    }
}
