//! Ingestion, query and statistics operations.
//!
//! These functions hold everything the HTTP layer does besides status codes
//! and JSON envelopes, so every route shares one implementation.

use crate::stats::{compute_statistics, AdherenceReport, DEFAULT_PERIOD_DAYS};
use crate::{
    DoseEvent, DoseStore, Error, EventFilter, NewDoseEvent, Result, DEFAULT_EVENT_LIMIT,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

/// Raw query parameters of the event listing
///
/// Kept as strings so malformed values surface as store-side errors rather
/// than as request rejections.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
}

/// Raw query parameters of the statistics endpoint
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    pub days: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| Error::InvalidParameter(format!("invalid {} {:?}: {}", name, value, e)))
}

fn parse_int(name: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|e| Error::InvalidParameter(format!("invalid {} {:?}: {}", name, value, e)))
}

impl EventsQuery {
    /// Resolve the raw parameters into a filter
    ///
    /// `start_date` starts at midnight UTC and `end_date` runs through
    /// 23:59:59 UTC of that day.
    pub fn to_filter(&self) -> Result<EventFilter> {
        let start = non_empty(&self.start_date)
            .map(|v| parse_date("start_date", v))
            .transpose()?
            .map(|date| date.and_time(NaiveTime::MIN).and_utc());

        let end = non_empty(&self.end_date)
            .map(|v| parse_date("end_date", v))
            .transpose()?
            .and_then(|date| date.and_hms_opt(23, 59, 59))
            .map(|end| end.and_utc());

        let limit = match non_empty(&self.limit) {
            Some(v) => parse_int("limit", v)?,
            None => DEFAULT_EVENT_LIMIT,
        };

        Ok(EventFilter { start, end, limit })
    }
}

impl StatisticsQuery {
    pub fn period_days(&self) -> Result<i64> {
        match non_empty(&self.days) {
            Some(v) => parse_int("days", v),
            None => Ok(DEFAULT_PERIOD_DAYS),
        }
    }
}

/// Validate and persist a single dose event
///
/// `payload` is the decoded request body, if any. A body that is absent,
/// not an object, without `event_type`, or with a non-integer
/// `dose_number` is a validation error.
pub async fn log_dose(
    store: &dyn DoseStore,
    payload: Option<serde_json::Value>,
) -> Result<DoseEvent> {
    let event = payload
        .filter(|value| value.get("event_type").map_or(false, |t| !t.is_null()))
        .and_then(|value| serde_json::from_value::<NewDoseEvent>(value).ok())
        .ok_or_else(|| Error::Validation("Invalid data".into()))?;

    let stored = store.insert(&event).await.map_err(|e| {
        tracing::error!("Failed to log dose event: {}", e);
        e
    })?;

    tracing::info!(
        id = stored.id,
        event_type = %stored.event_type,
        dose_number = ?stored.dose_number,
        "Logged dose event"
    );
    Ok(stored)
}

/// Filtered, limited event listing, newest first
pub async fn list_events(store: &dyn DoseStore, query: &EventsQuery) -> Result<Vec<DoseEvent>> {
    let filter = query.to_filter()?;
    let events = store.list(&filter).await?;
    tracing::debug!("Listed {} events with {:?}", events.len(), filter);
    Ok(events)
}

/// Statistics over the trailing window `[now - days, now]`
pub async fn statistics(
    store: &dyn DoseStore,
    query: &StatisticsQuery,
    now: DateTime<Utc>,
) -> Result<AdherenceReport> {
    let days = query.period_days()?;
    let start = Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| Error::InvalidParameter(format!("days out of range: {}", days)))?;

    let tallies = store.daily_tallies(start, now).await?;
    let report = compute_statistics(days, &tallies);

    tracing::debug!(
        days,
        dates = tallies.len(),
        adherence = report.statistics.adherence_percentage,
        "Computed statistics"
    );
    Ok(report)
}
