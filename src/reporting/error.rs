//! Error types for reporting operations

use crate::models::Module;
use crate::store::StoreError;
use chrono::NaiveDate;

/// Result type for reporting operations
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while building a report or export
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A date parameter could not be parsed
    #[error("Invalid date for '{field}': '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    /// An enumerated parameter had an unknown value
    #[error("Invalid value '{value}' for '{field}' (allowed: {})", .allowed.join(", "))]
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// date_from is after date_to
    #[error("Invalid date range: date_from {from} is after date_to {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    /// Export produced no rows
    #[error("No {module} records to export for the selected filters")]
    NoDataToExport { module: Module },

    /// The data store failed or timed out. Only the module and operation are
    /// rendered; the store detail is kept in the error source chain.
    #[error("Data source error while running {operation} for {module}")]
    DataSource {
        module: Module,
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// Report payload could not be encoded
    #[error("Failed to encode report output")]
    Encoding(#[source] serde_json::Error),
}

impl ReportError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::InvalidDate { .. } => "INVALID_DATE",
            ReportError::InvalidEnum { .. } => "INVALID_ENUM",
            ReportError::InvalidRange { .. } => "INVALID_RANGE",
            ReportError::NoDataToExport { .. } => "NO_DATA_TO_EXPORT",
            ReportError::DataSource { .. } => "DATA_SOURCE_ERROR",
            ReportError::Encoding(_) => "ENCODING_ERROR",
        }
    }

    /// Whether the caller caused the error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReportError::InvalidDate { .. }
                | ReportError::InvalidEnum { .. }
                | ReportError::InvalidRange { .. }
                | ReportError::NoDataToExport { .. }
        )
    }

    /// Offending request field, when there is one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ReportError::InvalidDate { field, .. } | ReportError::InvalidEnum { field, .. } => {
                Some(*field)
            }
            ReportError::InvalidRange { .. } => Some("date_from"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_enum_lists_allowed_values() {
        let err = ReportError::InvalidEnum {
            field: "granularity",
            value: "hour".to_string(),
            allowed: &["day", "week", "month"],
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'hour' for 'granularity' (allowed: day, week, month)"
        );
        assert_eq!(err.kind(), "INVALID_ENUM");
        assert_eq!(err.field(), Some("granularity"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_data_source_message_hides_store_detail() {
        let err = ReportError::DataSource {
            module: Module::Visits,
            operation: "general_summary",
            source: StoreError::Query("SELECT * FROM visitas -- syntax error".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("visits"));
        assert!(!message.contains("SELECT"));
        assert!(err.source().is_some());
        assert!(!err.is_client_error());
    }
}
