// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use cache::TravelCache;
use services::candidate_ranker::CandidateRanker;
use services::itinerary::ItineraryEngine;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub engine: ItineraryEngine,
    pub ranker: CandidateRanker,
    pub travel_cache: Arc<dyn TravelCache>,
    /// Whether a live routing service backs the travel estimator
    pub live_routing: bool,
}
