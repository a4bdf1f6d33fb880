use crate::models::{Dataset, FieldVisit, OperationalRecord, Quotation, ServiceOrder};
use crate::store::{ReportStore, RowQuery, StoreError, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory record store (for development and testing)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    orders: Arc<DashMap<i64, ServiceOrder>>,
    visits: Arc<DashMap<i64, FieldVisit>>,
    quotations: Arc<DashMap<i64, Quotation>>,
    unavailable: Arc<AtomicBool>,
    latency: Option<Duration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with a data set
    pub fn from_dataset(dataset: Dataset) -> Self {
        let store = Self::new();
        for order in dataset.orders {
            store.insert_order(order);
        }
        for visit in dataset.visits {
            store.insert_visit(visit);
        }
        for quotation in dataset.quotations {
            store.insert_quotation(quotation);
        }
        store
    }

    /// Delay every query by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_order(&self, order: ServiceOrder) {
        self.orders.insert(order.id, order);
    }

    pub fn insert_visit(&self, visit: FieldVisit) {
        self.visits.insert(visit.id, visit);
    }

    pub fn insert_quotation(&self, quotation: Quotation) {
        self.quotations.insert(quotation.id, quotation);
    }

    /// Make every subsequent query fail as if the backend were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    async fn select<R: OperationalRecord>(
        &self,
        rows: &DashMap<i64, R>,
        query: &RowQuery,
    ) -> StoreResult<Vec<R>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }

        let mut matched: Vec<(i64, R)> = rows
            .iter()
            .filter(|entry| query.predicate.matches_record(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        // Ties on timestamp fall back to id so output never depends on map iteration order
        matched.sort_by(|(a_id, a), (b_id, b)| {
            b.reference_date()
                .cmp(&a.reference_date())
                .then(b_id.cmp(a_id))
        });

        tracing::debug!(
            module = %R::MODULE,
            rows = matched.len(),
            "In-memory row query served"
        );

        Ok(matched.into_iter().map(|(_, row)| row).collect())
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn orders(&self, query: &RowQuery) -> StoreResult<Vec<ServiceOrder>> {
        self.select(&self.orders, query).await
    }

    async fn visits(&self, query: &RowQuery) -> StoreResult<Vec<FieldVisit>> {
        self.select(&self.visits, query).await
    }

    async fn quotations(&self, query: &RowQuery) -> StoreResult<Vec<Quotation>> {
        self.select(&self.quotations, query).await
    }
}
