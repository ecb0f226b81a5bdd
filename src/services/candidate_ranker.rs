use crate::config::RankerConfig;
use crate::constants::{PROXIMITY_DECAY_MILES, RATING_MIDPOINT};
use crate::error::Result;
use crate::models::{Coordinates, Curated, Place, PlaceCategory, ScoredPlace};
use crate::services::opening_hours::OpeningHours;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Nearby place discovery. Results come back in discovery order, which
/// the ranker uses to break score ties.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    async fn nearby(
        &self,
        center: &Coordinates,
        radius_miles: f64,
        categories: &[PlaceCategory],
    ) -> Result<Vec<Place>>;

    fn name(&self) -> &'static str;
}

/// Optional re-ranking step run over the locally ranked list. Returns the
/// candidates it wants, in the order it wants them.
#[async_trait]
pub trait Curator: Send + Sync {
    async fn curate(&self, filters: &RankFilters, ranked: &[ScoredPlace])
        -> Result<Vec<ScoredPlace>>;
}

/// What a slot is looking for
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RankFilters {
    /// Empty means restaurants
    #[serde(default)]
    pub categories: Vec<PlaceCategory>,
    /// Case-insensitive keywords matched against cuisine tags and names
    #[serde(default)]
    pub cuisine: Vec<String>,
    /// Preferred price tier, 1 to 4
    #[serde(default)]
    pub budget: Option<u8>,
    /// The instant the slot starts, checked against opening hours in its
    /// own offset
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub target: Option<OffsetDateTime>,
    #[serde(default)]
    pub radius_miles: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RankFilters {
    fn categories(&self) -> Vec<PlaceCategory> {
        if self.categories.is_empty() {
            vec![PlaceCategory::Restaurant]
        } else {
            self.categories.clone()
        }
    }
}

pub struct CandidateRanker {
    source: Arc<dyn PlaceSource>,
    curator: Option<Arc<dyn Curator>>,
    config: RankerConfig,
}

impl CandidateRanker {
    pub fn new(source: Arc<dyn PlaceSource>, config: RankerConfig) -> Self {
        CandidateRanker {
            source,
            curator: None,
            config,
        }
    }

    pub fn with_curator(mut self, curator: Arc<dyn Curator>) -> Self {
        self.curator = Some(curator);
        self
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Discover, score and order candidates around an anchor.
    ///
    /// A failed discovery yields an empty degraded list, and a failed
    /// curation yields the locally ranked list, also degraded. Neither is
    /// an error to the caller.
    pub async fn rank(&self, anchor: &Coordinates, filters: &RankFilters) -> Curated<Vec<ScoredPlace>> {
        let radius = filters
            .radius_miles
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(self.config.search_radius_miles);
        let limit = filters
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(self.config.result_limit);

        let places = match self.source.nearby(anchor, radius, &filters.categories()).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!(source = self.source.name(), "Place discovery failed: {}", e);
                return Curated::degraded(Vec::new());
            }
        };
        let discovered = places.len();

        let mut ranked: Vec<ScoredPlace> = places
            .into_iter()
            .filter_map(|place| {
                let distance_miles = anchor.distance_miles_to(&place.coordinates);
                if distance_miles > radius {
                    return None;
                }
                let open = filters
                    .target
                    .and_then(|at| open_at(place.opening_hours.as_deref(), at));
                let score = score_place(&place, distance_miles, open, filters, &self.config);
                Some(ScoredPlace {
                    place,
                    distance_miles,
                    score,
                    open_at_target_instant: open,
                })
            })
            .collect();

        // sort_by is stable: equal scores keep discovery order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);

        tracing::debug!(
            source = self.source.name(),
            "Ranked {} of {} discovered places within {:.1}mi",
            ranked.len(),
            discovered,
            radius
        );

        let Some(curator) = &self.curator else {
            return Curated::complete(ranked);
        };

        match curator.curate(filters, &ranked).await {
            Ok(curated) => Curated::complete(curated),
            Err(e) => {
                tracing::warn!("Curation failed, keeping local ranking: {}", e);
                Curated::degraded(ranked)
            }
        }
    }
}

/// `None` when the hours are missing or in a form we cannot read
pub fn open_at(opening_hours: Option<&str>, at: OffsetDateTime) -> Option<bool> {
    let hours = OpeningHours::parse(opening_hours?)?;
    Some(hours.is_open_at(PrimitiveDateTime::new(at.date(), at.time())))
}

/// Linear decay from 1 at the anchor to 0 at the decay distance
pub fn proximity_factor(distance_miles: f64) -> f64 {
    (1.0 - distance_miles / PROXIMITY_DECAY_MILES).clamp(0.0, 1.0)
}

pub fn score_place(
    place: &Place,
    distance_miles: f64,
    open: Option<bool>,
    filters: &RankFilters,
    config: &RankerConfig,
) -> f64 {
    let mut score = 0.0;

    if let Some(rating) = place.rating {
        score += config.weight_rating * (f64::from(rating) - RATING_MIDPOINT);
    }

    if let Some(reviews) = place.review_count {
        score += config.weight_reviews * (1.0 + f64::from(reviews)).ln();
    }

    if let (Some(budget), Some(tier)) = (filters.budget, place.price_tier) {
        score -= config.weight_price * f64::from(budget.abs_diff(tier));
    }

    if matches_cuisine(place, &filters.cuisine) {
        score += config.cuisine_bonus;
    }

    score += config.weight_proximity * proximity_factor(distance_miles);

    // Closed places are penalized, never excluded
    if open == Some(false) {
        score -= config.closed_penalty;
    }

    score
}

fn matches_cuisine(place: &Place, keywords: &[String]) -> bool {
    let name = place.name.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .any(|k| name.contains(&k) || place.cuisine.iter().any(|c| c.to_lowercase().contains(&k)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Completeness;
    use crate::AppError;
    use time::macros::datetime;

    struct StaticSource(Vec<Place>);

    #[async_trait]
    impl PlaceSource for StaticSource {
        async fn nearby(&self, _: &Coordinates, _: f64, _: &[PlaceCategory]) -> Result<Vec<Place>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    struct DownSource;

    #[async_trait]
    impl PlaceSource for DownSource {
        async fn nearby(&self, _: &Coordinates, _: f64, _: &[PlaceCategory]) -> Result<Vec<Place>> {
            Err(AppError::PlacesApi("unreachable".to_string()))
        }

        fn name(&self) -> &'static str {
            "down"
        }
    }

    struct Reverse;

    #[async_trait]
    impl Curator for Reverse {
        async fn curate(&self, _: &RankFilters, ranked: &[ScoredPlace]) -> Result<Vec<ScoredPlace>> {
            Ok(ranked.iter().rev().cloned().collect())
        }
    }

    struct BrokenCurator;

    #[async_trait]
    impl Curator for BrokenCurator {
        async fn curate(&self, _: &RankFilters, _: &[ScoredPlace]) -> Result<Vec<ScoredPlace>> {
            Err(AppError::Curation("model timeout".to_string()))
        }
    }

    fn anchor() -> Coordinates {
        Coordinates::new(40.7505, -73.9934).unwrap()
    }

    /// A restaurant `miles` north of the anchor
    fn place(name: &str, miles: f64) -> Place {
        Place::new(
            name.to_string(),
            PlaceCategory::Restaurant,
            anchor().offset_north_miles(miles),
        )
    }

    fn ranker(places: Vec<Place>) -> CandidateRanker {
        CandidateRanker::new(Arc::new(StaticSource(places)), RankerConfig::default())
    }

    fn names(ranked: &Curated<Vec<ScoredPlace>>) -> Vec<&str> {
        ranked.value.iter().map(|p| p.place.name.as_str()).collect()
    }

    #[test]
    fn test_proximity_decays_to_zero() {
        assert_eq!(proximity_factor(0.0), 1.0);
        assert!((proximity_factor(0.8) - 0.5).abs() < 1e-9);
        assert_eq!(proximity_factor(1.6), 0.0);
        assert_eq!(proximity_factor(3.0), 0.0);
    }

    #[test]
    fn test_score_terms() {
        let config = RankerConfig::default();
        let filters = RankFilters {
            cuisine: vec!["Thai".to_string()],
            budget: Some(2),
            ..RankFilters::default()
        };

        let mut p = place("Siam", 2.0);
        assert_eq!(score_place(&p, 2.0, None, &filters, &config), 0.0);

        p.rating = Some(4.5);
        p.review_count = Some(0);
        p.price_tier = Some(4);
        p.cuisine = vec!["thai".to_string()];
        let expected = 0.5 - 0.6 * 2.0 + 0.8;
        assert!((score_place(&p, 2.0, None, &filters, &config) - expected).abs() < 1e-9);

        let closed = score_place(&p, 2.0, Some(false), &filters, &config);
        assert!((closed - (expected - 1.5)).abs() < 1e-9);
        let open = score_place(&p, 2.0, Some(true), &filters, &config);
        assert!((open - expected).abs() < 1e-9);
    }

    #[test]
    fn test_open_at_uses_local_wall_clock() {
        // Sunday 19:00 in New York
        let at = datetime!(2025-06-01 19:00 -4);
        assert_eq!(open_at(Some("Su 17:00-22:00"), at), Some(true));
        assert_eq!(open_at(Some("Mo-Sa 17:00-22:00"), at), Some(false));
        assert_eq!(open_at(Some("PH off"), at), None);
        assert_eq!(open_at(None, at), None);
    }

    #[tokio::test]
    async fn test_rank_orders_by_score_and_filters_radius() {
        let ranked = ranker(vec![place("Far", 1.2), place("Near", 0.2), place("Outside", 3.0)])
            .rank(&anchor(), &RankFilters::default())
            .await;

        assert_eq!(ranked.status, Completeness::Complete);
        assert_eq!(names(&ranked), vec!["Near", "Far"]);
        assert!(ranked.value[0].distance_miles < 0.25);
    }

    #[tokio::test]
    async fn test_ties_keep_discovery_order() {
        let ranked = ranker(vec![place("B", 1.7), place("A", 1.8), place("C", 1.9)])
            .rank(&anchor(), &RankFilters::default())
            .await;
        assert_eq!(names(&ranked), vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn test_closed_places_are_penalized_not_dropped() {
        let mut closed = place("Closed", 0.1);
        closed.opening_hours = Some("Mo-Fr 11:00-15:00".to_string());
        let mut open = place("Open", 0.3);
        open.opening_hours = Some("24/7".to_string());

        let filters = RankFilters {
            target: Some(datetime!(2025-06-01 17:00 UTC)),
            ..RankFilters::default()
        };
        let ranked = ranker(vec![closed, open]).rank(&anchor(), &filters).await;

        assert_eq!(names(&ranked), vec!["Open", "Closed"]);
        assert_eq!(ranked.value[1].open_at_target_instant, Some(false));
    }

    #[tokio::test]
    async fn test_limit_applies_after_sorting() {
        let filters = RankFilters {
            limit: Some(1),
            ..RankFilters::default()
        };
        let ranked = ranker(vec![place("Second", 0.5), place("First", 0.1)])
            .rank(&anchor(), &filters)
            .await;
        assert_eq!(names(&ranked), vec!["First"]);
    }

    #[tokio::test]
    async fn test_discovery_failure_is_empty_and_degraded() {
        let ranker = CandidateRanker::new(Arc::new(DownSource), RankerConfig::default());
        let ranked = ranker.rank(&anchor(), &RankFilters::default()).await;
        assert!(ranked.value.is_empty());
        assert!(ranked.status.is_degraded());
    }

    #[tokio::test]
    async fn test_curator_success_and_failure() {
        let places = vec![place("Near", 0.1), place("Far", 1.0)];

        let curated = ranker(places.clone())
            .with_curator(Arc::new(Reverse))
            .rank(&anchor(), &RankFilters::default())
            .await;
        assert_eq!(curated.status, Completeness::Complete);
        assert_eq!(names(&curated), vec!["Far", "Near"]);

        let fallback = ranker(places)
            .with_curator(Arc::new(BrokenCurator))
            .rank(&anchor(), &RankFilters::default())
            .await;
        assert_eq!(fallback.status, Completeness::Degraded);
        assert_eq!(names(&fallback), vec!["Near", "Far"]);
    }
}
