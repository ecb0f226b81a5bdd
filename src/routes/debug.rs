use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Report which collaborators are wired up
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.travel_cache.get_stats().await;

    Json(json!({
        "status": "ok",
        "checks": {
            "engine": format!("{:?}", state.engine.config().variant).to_lowercase(),
            "live_routing": if state.live_routing { "configured" } else { "heuristic only" },
            "travel_cache": {
                "backend": state.travel_cache.backend_name(),
                "stats": stats,
            },
            "places": state.ranker.source_name(),
        }
    }))
}
