//! Request parameter normalization
//!
//! Turns loosely-typed, optional query parameters into a validated
//! [`ReportFilter`]. All input validation happens here, before any query
//! reaches the data store.

use crate::models::Module;
use crate::reporting::error::{ReportError, ReportResult};
use crate::reporting::export::ExportFormat;
use crate::store::DatePredicate;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

const MODULE_SELECTOR_NAMES: &[&str] = &["orders", "visits", "quotations", "all"];

/// Time-bucket size for trend and activity series
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    pub const NAMES: &'static [&'static str] = &["day", "week", "month"];
}

/// Raw report parameters as received from the transport layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportParams {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub granularity: Option<String>,
    pub module: Option<String>,
    #[serde(alias = "q")]
    pub search: Option<String>,
}

impl ReportParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.date_from = Some(from.into());
        self.date_to = Some(to.into());
        self
    }

    pub fn with_granularity(mut self, granularity: impl Into<String>) -> Self {
        self.granularity = Some(granularity.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// Canonical, validated report filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub granularity: Granularity,
    pub modules: BTreeSet<Module>,
    pub search: Option<String>,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            granularity: Granularity::default(),
            modules: Module::iter().collect(),
            search: None,
        }
    }
}

impl ReportFilter {
    /// Validate and canonicalize raw parameters
    pub fn normalize(params: &ReportParams) -> ReportResult<Self> {
        let from = parse_date("date_from", params.date_from.as_deref())?;
        let to = parse_date("date_to", params.date_to.as_deref())?;
        check_range(from, to)?;

        let granularity = match non_blank(params.granularity.as_deref()) {
            Some(raw) => parse_enum("granularity", raw, Granularity::NAMES)?,
            None => Granularity::default(),
        };

        let modules = parse_modules(params.module.as_deref())?;

        let search = non_blank(params.search.as_deref()).map(|s| s.to_string());

        Ok(Self {
            from,
            to,
            granularity,
            modules,
            search,
        })
    }

    /// Fill absent bounds with defaults, re-checking the resulting range
    pub fn with_default_bounds(mut self, from: NaiveDate, to: NaiveDate) -> ReportResult<Self> {
        self.from = self.from.or(Some(from));
        self.to = self.to.or(Some(to));
        check_range(self.from, self.to)?;
        Ok(self)
    }

    /// Structured store predicate for the filter's date bounds
    pub fn predicate(&self) -> DatePredicate {
        DatePredicate::between(self.from, self.to)
    }

    pub fn includes(&self, module: Module) -> bool {
        self.modules.contains(&module)
    }

    /// Lowercased search needle, if any
    pub fn search_needle(&self) -> Option<String> {
        self.search.as_ref().map(|s| s.to_lowercase())
    }
}

/// Raw export parameters as received from the transport layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub module: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(alias = "q")]
    pub search: Option<String>,
}

/// Validated export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub module: Module,
    pub filter: ReportFilter,
}

impl ExportRequest {
    /// Validate export parameters; format defaults to CSV, module is required
    pub fn normalize(params: &ExportParams) -> ReportResult<Self> {
        let format = match non_blank(params.format.as_deref()) {
            Some(raw) => parse_enum("format", raw, ExportFormat::NAMES)?,
            None => ExportFormat::Csv,
        };

        let module: Module = parse_enum(
            "module",
            non_blank(params.module.as_deref()).unwrap_or_default(),
            Module::NAMES,
        )?;

        let filter = ReportFilter::normalize(&ReportParams {
            date_from: params.date_from.clone(),
            date_to: params.date_to.clone(),
            granularity: None,
            module: Some(module.to_string()),
            search: params.search.clone(),
        })?;

        Ok(Self {
            format,
            module,
            filter,
        })
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(field: &'static str, raw: Option<&str>) -> ReportResult<Option<NaiveDate>> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.naive_utc().date()));
    }

    Err(ReportError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

fn check_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ReportResult<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ReportError::InvalidRange { from, to });
        }
    }
    Ok(())
}

fn parse_enum<T: FromStr>(
    field: &'static str,
    raw: &str,
    allowed: &'static [&'static str],
) -> ReportResult<T> {
    T::from_str(&raw.to_ascii_lowercase()).map_err(|_| ReportError::InvalidEnum {
        field,
        value: raw.to_string(),
        allowed,
    })
}

fn parse_modules(raw: Option<&str>) -> ReportResult<BTreeSet<Module>> {
    match non_blank(raw) {
        None => Ok(Module::iter().collect()),
        Some(raw) if raw.eq_ignore_ascii_case("all") => Ok(Module::iter().collect()),
        Some(raw) => {
            let module: Module = parse_enum("module", raw, MODULE_SELECTOR_NAMES)?;
            Ok(BTreeSet::from([module]))
        }
    }
}
