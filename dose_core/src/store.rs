//! Dose event persistence.
//!
//! Events are append-only: the store assigns `id` and `timestamp` on insert
//! and exposes no way to update or delete a row.

use crate::{DailyTally, DoseEvent, Error, EventFilter, NewDoseEvent, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Dose store trait for persisting and reading dose events
#[async_trait]
pub trait DoseStore: Send + Sync {
    /// Append one event, returning it with its assigned id and timestamp
    async fn insert(&self, event: &NewDoseEvent) -> Result<DoseEvent>;

    /// Events matching `filter`, newest first, at most `filter.limit` rows
    async fn list(&self, filter: &EventFilter) -> Result<Vec<DoseEvent>>;

    /// Per-date counts of events with `start <= timestamp <= end`,
    /// most recent date first
    async fn daily_tallies(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyTally>>;
}

/// In-process store used by tests and the `--in-memory` server mode
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<Vec<DoseEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event with an explicit timestamp
    ///
    /// Ids stay strictly increasing in insertion order regardless of the
    /// timestamp given.
    pub fn insert_at(&self, event: &NewDoseEvent, timestamp: DateTime<Utc>) -> Result<DoseEvent> {
        let mut events = self.lock()?;
        let id = events.last().map_or(1, |last| last.id + 1);
        let stored = DoseEvent {
            id,
            event_type: event.event_type.clone(),
            dose_number: event.dose_number,
            timestamp,
        };
        events.push(stored.clone());
        tracing::debug!("Stored dose event {} at {}", id, timestamp);
        Ok(stored)
    }

    /// Number of stored events
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<DoseEvent>>> {
        self.events
            .lock()
            .map_err(|_| Error::Other("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl DoseStore for MemoryStore {
    async fn insert(&self, event: &NewDoseEvent) -> Result<DoseEvent> {
        self.insert_at(event, Utc::now())
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<DoseEvent>> {
        if filter.limit < 0 {
            return Err(Error::InvalidParameter(
                "LIMIT must not be negative".into(),
            ));
        }

        let events = self.lock()?;
        let mut matching: Vec<DoseEvent> = events
            .iter()
            .filter(|e| filter.contains(e.timestamp))
            .cloned()
            .collect();

        // Newest first; ties broken by id so the order is stable
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        matching.truncate(filter.limit as usize);
        Ok(matching)
    }

    async fn daily_tallies(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyTally>> {
        let events = self.lock()?;
        let mut by_date = BTreeMap::new();

        for event in events
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
        {
            let date = event.timestamp.date_naive();
            by_date
                .entry(date)
                .or_insert_with(|| DailyTally::empty(date))
                .record(&event.event_type);
        }

        Ok(by_date.into_values().rev().collect())
    }
}
