//! Read-only query port onto the operational data store.
//!
//! The reporting engine never builds query text. It hands adapters a
//! structured [`DatePredicate`], and adapters translate it into whatever
//! parameterized form their backend needs. Rows always come back newest
//! first.

mod factory;
mod memory;
mod predicate;

pub use factory::{create_in_memory_store, create_store};
pub use memory::InMemoryStore;
pub use predicate::{DatePredicate, RowQuery};

use crate::models::{FieldVisit, OperationalRecord, Quotation, ServiceOrder};
use async_trait::async_trait;
use std::time::Duration;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures raised by a store adapter
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    /// Query exceeded its deadline
    #[error("query timed out after {after:?}")]
    Timeout { after: Duration },

    /// Backend rejected or failed the query
    #[error("query failed: {0}")]
    Query(String),
}

/// Trait for read-only access to operational records
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Active service orders matching the query
    async fn orders(&self, query: &RowQuery) -> StoreResult<Vec<ServiceOrder>>;

    /// Active field visits matching the query
    async fn visits(&self, query: &RowQuery) -> StoreResult<Vec<FieldVisit>>;

    /// Active quotations matching the query
    async fn quotations(&self, query: &RowQuery) -> StoreResult<Vec<Quotation>>;
}

/// Dispatches a row query to the [`ReportStore`] method for a record type.
#[async_trait]
pub trait Queryable: OperationalRecord + Sized {
    async fn fetch(store: &dyn ReportStore, query: &RowQuery) -> StoreResult<Vec<Self>>;
}

#[async_trait]
impl Queryable for ServiceOrder {
    async fn fetch(store: &dyn ReportStore, query: &RowQuery) -> StoreResult<Vec<Self>> {
        store.orders(query).await
    }
}

#[async_trait]
impl Queryable for FieldVisit {
    async fn fetch(store: &dyn ReportStore, query: &RowQuery) -> StoreResult<Vec<Self>> {
        store.visits(query).await
    }
}

#[async_trait]
impl Queryable for Quotation {
    async fn fetch(store: &dyn ReportStore, query: &RowQuery) -> StoreResult<Vec<Self>> {
        store.quotations(query).await
    }
}
