use async_trait::async_trait;
use encore::cache::{MemoryTravelCache, TravelCache};
use encore::config::{PlannerConfig, RankerConfig};
use encore::models::{
    Anchor, Coordinates, EstimateSource, Place, PlaceCategory, ScheduleConfiguration,
    TravelEstimate, TravelMode,
};
use encore::services::candidate_ranker::{CandidateRanker, PlaceSource};
use encore::services::itinerary::ItineraryEngine;
use encore::services::travel_estimator::TravelEstimator;
use encore::AppState;
use std::sync::Arc;

/// Madison Square Garden
#[allow(dead_code)]
pub fn venue() -> Anchor {
    Anchor::new(
        "Madison Square Garden",
        Coordinates::new(40.7505, -73.9934).unwrap(),
    )
}

/// An anchor due north of the venue
#[allow(dead_code)]
pub fn anchor_north(name: &str, miles: f64) -> Anchor {
    Anchor::new(name, venue().coordinates.offset_north_miles(miles))
}

/// 2025-06-01 19:00 show at the venue with default timings
#[allow(dead_code)]
pub fn base_request() -> ScheduleConfiguration {
    ScheduleConfiguration::new("2025-06-01T19:00:00", venue())
}

/// Every leg takes the same number of minutes
#[allow(dead_code)]
pub struct ConstantEstimator {
    pub minutes: u32,
    pub source: EstimateSource,
}

#[async_trait]
impl TravelEstimator for ConstantEstimator {
    async fn estimate(&self, _: &Coordinates, _: &Coordinates, _: TravelMode) -> TravelEstimate {
        TravelEstimate::new(self.minutes, self.source)
    }
}

#[allow(dead_code)]
pub fn constant_engine(minutes: u32, config: PlannerConfig) -> ItineraryEngine {
    ItineraryEngine::new(
        Arc::new(ConstantEstimator {
            minutes,
            source: EstimateSource::Live,
        }),
        config,
    )
}

/// Place source answering from a fixed list
#[allow(dead_code)]
pub struct StaticPlaces(pub Vec<Place>);

#[async_trait]
impl PlaceSource for StaticPlaces {
    async fn nearby(
        &self,
        _: &Coordinates,
        _: f64,
        _: &[PlaceCategory],
    ) -> encore::Result<Vec<Place>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// A restaurant `miles` north of the venue
#[allow(dead_code)]
pub fn restaurant(name: &str, miles: f64) -> Place {
    Place::new(
        name.to_string(),
        PlaceCategory::Restaurant,
        venue().coordinates.offset_north_miles(miles),
    )
}

/// Router over deterministic collaborators
#[allow(dead_code)]
pub fn test_app(places: Vec<Place>) -> axum::Router {
    let travel_cache: Arc<dyn TravelCache> = Arc::new(MemoryTravelCache::new(60, 100));

    let state = Arc::new(AppState {
        engine: constant_engine(10, PlannerConfig::default()),
        ranker: CandidateRanker::new(Arc::new(StaticPlaces(places)), RankerConfig::default()),
        travel_cache,
        live_routing: false,
    });

    encore::routes::create_router(state)
}

/// Check if we should skip real API tests
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok()
}
