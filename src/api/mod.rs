pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::reporting::ReportingEngine;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReportingEngine>,
    pub request_timeout: Duration,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: Arc<ReportingEngine>) -> Self {
        Self {
            engine,
            request_timeout: Duration::from_secs(30),
            started_at: Instant::now(),
        }
    }

    /// Set the per-request deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
