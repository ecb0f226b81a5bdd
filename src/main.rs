use axum::Router;
use encore::cache::{MemoryTravelCache, TravelCache};
use encore::config::Config;
use encore::constants::DEFAULT_TRAVEL_CACHE_MAX_ENTRIES;
use encore::services::candidate_ranker::CandidateRanker;
use encore::services::itinerary::ItineraryEngine;
use encore::services::mapbox::{AuthMode, MapboxClient};
use encore::services::overpass::OverpassClient;
use encore::services::travel_estimator::{FallbackEstimator, LiveRouter};
use encore::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;
    config
        .planner
        .validate()
        .map_err(|e| format!("Invalid planner configuration: {}", e))?;

    tracing::info!("Starting Encore itinerary server");
    tracing::info!(variant = ?config.planner.variant, "Configuration loaded successfully");

    let travel_cache: Arc<dyn TravelCache> = Arc::new(MemoryTravelCache::new(
        config.travel_cache_ttl,
        DEFAULT_TRAVEL_CACHE_MAX_ENTRIES,
    ));

    // Live routing is optional; without it every leg uses the heuristic
    let live: Option<Arc<dyn LiveRouter>> = match (&config.mapbox_api_key, &config.mapbox_base_url) {
        (Some(key), Some(base_url)) => Some(Arc::new(MapboxClient::with_config(
            key.clone(),
            base_url.clone(),
            AuthMode::BearerHeader,
        ))),
        (Some(key), None) => Some(Arc::new(MapboxClient::new(key.clone()))),
        (None, _) => {
            tracing::warn!("MAPBOX_API_KEY not set. Travel legs use the geometric heuristic.");
            None
        }
    };
    let live_routing = live.is_some();

    let estimator = Arc::new(FallbackEstimator::new(
        live,
        travel_cache.clone(),
        Duration::from_millis(config.travel_lookup_timeout_ms),
    ));

    let places = match &config.overpass_url {
        Some(url) => OverpassClient::with_url(url.clone()),
        None => OverpassClient::new(),
    };

    // Create application state
    let state = Arc::new(AppState {
        engine: ItineraryEngine::new(estimator, config.planner.clone()),
        ranker: CandidateRanker::new(Arc::new(places), config.ranker.clone()),
        travel_cache,
        live_routing,
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", encore::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
