pub mod candidates;
pub mod debug;
pub mod itinerary;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/itinerary", post(itinerary::create_itinerary))
        .route("/itinerary/ics", post(itinerary::export_ics))
        .route("/candidates", post(candidates::rank_candidates))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
