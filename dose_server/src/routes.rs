use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use dose_core::{
    service::{self, EventsQuery, StatisticsQuery},
    DoseEvent,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

#[derive(Serialize)]
pub struct EventsResponse {
    pub status: &'static str,
    pub count: usize,
    pub events: Vec<DoseEvent>,
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub report: dose_core::AdherenceReport,
}

pub async fn log_dose_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload
        .map(|Json(value)| value)
        .map_err(|e| tracing::debug!("Rejected dose payload: {}", e))
        .ok();

    service::log_dose(state.store.as_ref(), payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "message": "Log received"})),
    ))
}

pub async fn events_handler(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let events = service::list_events(state.store.as_ref(), &query).await?;

    Ok(Json(EventsResponse {
        status: "success",
        count: events.len(),
        events,
    }))
}

pub async fn statistics_handler(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let report = service::statistics(state.store.as_ref(), &query, Utc::now()).await?;

    Ok(Json(StatisticsResponse {
        status: "success",
        report,
    }))
}

pub async fn dashboard_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    tokio::fs::read_to_string(&state.dashboard_path)
        .await
        .map(Html)
        .map_err(|e| {
            tracing::warn!("Unable to read dashboard {:?}: {}", state.dashboard_path, e);
            ApiError::NotFound("Dashboard not found".into())
        })
}

pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "service": "Medicine Dispenser API",
        "version": "1.0",
        "endpoints": {
            "POST /log_dose": "Log a dose event (TAKEN or MISSED)",
            "GET /api/events": "Retrieve dose log events",
            "GET /api/statistics": "Get adherence statistics",
            "GET /dashboard": "View visualization dashboard"
        }
    }))
}
