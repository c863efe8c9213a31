#![forbid(unsafe_code)]

//! Core domain model and business logic for the dose log service.
//!
//! This crate provides:
//! - Domain types (dose events, filters, daily tallies)
//! - Configuration and logging setup
//! - Persistence (the `DoseStore` trait, PostgreSQL and in-memory stores)
//! - Adherence statistics (totals, percentage, streaks)
//! - The ingestion, query and statistics operations used by the HTTP layer

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod postgres;
pub mod stats;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{DoseStore, MemoryStore};
pub use postgres::PgStore;
pub use stats::{compute_statistics, AdherenceReport, DOSES_PER_DAY};
pub use service::{list_events, log_dose, statistics, EventsQuery, StatisticsQuery};
