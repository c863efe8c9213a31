//! Core domain types for the dose log.
//!
//! This module defines the fundamental types used throughout the system:
//! - Dose events as persisted and as submitted
//! - Event filters for the listing query
//! - Per-day tallies consumed by the statistics engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Event Types
// ============================================================================

/// Event types the statistics recognise.
///
/// Stored events keep their `event_type` verbatim, so rows with other
/// values still count towards totals but never as taken or missed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Taken,
    Missed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Taken => "TAKEN",
            EventKind::Missed => "MISSED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TAKEN" => Some(EventKind::Taken),
            "MISSED" => Some(EventKind::Missed),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Dose Events
// ============================================================================

/// A persisted dose event (one row of `dose_log`)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct DoseEvent {
    pub id: i64,
    pub event_type: String,
    pub dose_number: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

impl DoseEvent {
    /// The recognised kind of this event, if any
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.event_type)
    }
}

/// A dose event as submitted by a dispenser, before the store assigns
/// its id and timestamp
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewDoseEvent {
    pub event_type: String,
    #[serde(default)]
    pub dose_number: Option<i32>,
}

impl NewDoseEvent {
    pub fn new(kind: EventKind, dose_number: Option<i32>) -> Self {
        Self {
            event_type: kind.as_str().to_string(),
            dose_number,
        }
    }
}

// ============================================================================
// Query and Aggregate Types
// ============================================================================

/// Default number of rows returned by the event listing
pub const DEFAULT_EVENT_LIMIT: i64 = 100;

/// Filter for the event listing, with both bounds inclusive
#[derive(Clone, Debug, PartialEq)]
pub struct EventFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: i64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl EventFilter {
    /// Whether a timestamp falls inside the filter's bounds
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| timestamp >= start)
            && self.end.map_or(true, |end| timestamp <= end)
    }
}

/// Event counts for one UTC calendar date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct DailyTally {
    pub date: NaiveDate,
    pub total: i64,
    pub taken: i64,
    pub missed: i64,
}

impl DailyTally {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            taken: 0,
            missed: 0,
        }
    }

    /// Count one event of the given type towards this date
    pub fn record(&mut self, event_type: &str) {
        self.total += 1;
        match EventKind::parse(event_type) {
            Some(EventKind::Taken) => self.taken += 1,
            Some(EventKind::Missed) => self.missed += 1,
            None => {}
        }
    }
}
