use crate::error::Result;
use crate::models::{Itinerary, ScheduleConfiguration};
use crate::services::calendar;
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// POST /itinerary
/// Build the evening's schedule for one show
pub async fn create_itinerary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScheduleConfiguration>,
) -> Result<Json<Itinerary>> {
    tracing::info!(
        start = %request.show.start_iso,
        hotel = request.hotel.is_some(),
        mode = %request.prefs.mode,
        "Itinerary request"
    );

    let itinerary = state.engine.schedule(&request).await?;

    Ok(Json(itinerary))
}

/// POST /itinerary/ics
/// Same schedule, as an iCalendar download
pub async fn export_ics(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScheduleConfiguration>,
) -> Result<impl IntoResponse> {
    let itinerary = state.engine.schedule(&request).await?;

    let name = request
        .venue
        .as_ref()
        .map(|v| format!("Show night at {}", v.name))
        .unwrap_or_else(|| "Show night".to_string());
    let body = calendar::to_ics(&itinerary, &name)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"itinerary.ics\"",
            ),
        ],
        body,
    ))
}
