use crate::error::{AppError, Result};
use crate::models::{Completeness, Coordinates, ScoredPlace};
use crate::services::candidate_ranker::RankFilters;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesRequest {
    #[serde(alias = "coordinate")]
    pub anchor: Coordinates,
    #[serde(default)]
    pub filters: RankFilters,
}

impl CandidatesRequest {
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.anchor.validate()?;
        if let Some(budget) = self.filters.budget {
            if !(1..=4).contains(&budget) {
                return Err("filters.budget must be between 1 and 4".to_string());
            }
        }
        if let Some(radius) = self.filters.radius_miles {
            if !radius.is_finite() || radius <= 0.0 || radius > 25.0 {
                return Err("filters.radiusMiles must be between 0 and 25".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub places: Vec<ScoredPlace>,
    pub status: Completeness,
}

/// POST /candidates
/// Ranked places around an anchor for a dining or activity slot
pub async fn rank_candidates(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CandidatesRequest>,
) -> Result<Json<CandidatesResponse>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    tracing::info!(
        lat = request.anchor.lat,
        lng = request.anchor.lng,
        categories = ?request.filters.categories,
        "Candidate request"
    );

    let ranked = state.ranker.rank(&request.anchor, &request.filters).await;

    Ok(Json(CandidatesResponse {
        places: ranked.value,
        status: ranked.status,
    }))
}
