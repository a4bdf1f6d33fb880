//! Maintenance reporting service
//!
//! Summaries, performance metrics, activity series and exports over the
//! service orders, field visits and quotations of a maintenance operation.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reporting;
pub mod store;

pub use crate::config::Config;
pub use crate::error::{AppError, Result};
