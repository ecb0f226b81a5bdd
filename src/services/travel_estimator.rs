use crate::cache::{travel_cache_key, TravelCache};
use crate::constants::{MAX_TRAVEL_MINUTES, MIN_TRAVEL_MINUTES};
use crate::error::Result;
use crate::models::{Coordinates, EstimateSource, TravelEstimate, TravelMode};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A live routing service. May fail for any reason; callers are expected
/// to fall back.
#[async_trait]
pub trait LiveRouter: Send + Sync {
    /// Raw one-way duration in minutes
    async fn route_minutes(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<f64>;

    fn name(&self) -> &'static str;
}

/// One-way travel time between two points. Never fails: every
/// implementation resolves to some positive number of minutes.
#[async_trait]
pub trait TravelEstimator: Send + Sync {
    async fn estimate(&self, from: &Coordinates, to: &Coordinates, mode: TravelMode)
        -> TravelEstimate;
}

/// Great-circle miles over an assumed speed, floored at 4 minutes
pub fn heuristic_minutes(from: &Coordinates, to: &Coordinates, mode: TravelMode) -> u32 {
    let miles = from.distance_miles_to(to);
    let minutes = (miles / mode.assumed_speed_mph() * 60.0).round();
    if minutes.is_finite() && minutes > 0.0 {
        (minutes as u32).max(MIN_TRAVEL_MINUTES)
    } else {
        MIN_TRAVEL_MINUTES
    }
}

/// Purely geometric estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricEstimator;

#[async_trait]
impl TravelEstimator for GeometricEstimator {
    async fn estimate(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> TravelEstimate {
        TravelEstimate::new(heuristic_minutes(from, to, mode), EstimateSource::Heuristic)
    }
}

/// Live lookup with a bounded wait, cached, falling back to the geometric
/// heuristic on any failure.
pub struct FallbackEstimator {
    live: Option<Arc<dyn LiveRouter>>,
    cache: Arc<dyn TravelCache>,
    lookup_timeout: Duration,
}

impl FallbackEstimator {
    pub fn new(
        live: Option<Arc<dyn LiveRouter>>,
        cache: Arc<dyn TravelCache>,
        lookup_timeout: Duration,
    ) -> Self {
        FallbackEstimator {
            live,
            cache,
            lookup_timeout,
        }
    }

    fn fallback(from: &Coordinates, to: &Coordinates, mode: TravelMode) -> TravelEstimate {
        TravelEstimate::new(heuristic_minutes(from, to, mode), EstimateSource::Heuristic)
    }
}

#[async_trait]
impl TravelEstimator for FallbackEstimator {
    async fn estimate(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> TravelEstimate {
        let Some(live) = &self.live else {
            return Self::fallback(from, to, mode);
        };

        let key = travel_cache_key(from, to, mode);
        if let Some(minutes) = self.cache.get_minutes(&key).await {
            return TravelEstimate::new(minutes, EstimateSource::Cached);
        }

        let lookup = tokio::time::timeout(self.lookup_timeout, live.route_minutes(from, to, mode));
        match lookup.await {
            Ok(Ok(raw))
                if raw.is_finite() && raw >= 0.0 && raw <= f64::from(MAX_TRAVEL_MINUTES) =>
            {
                let minutes = (raw.round() as u32).max(MIN_TRAVEL_MINUTES);
                self.cache.put_minutes(&key, minutes).await;
                TravelEstimate::new(minutes, EstimateSource::Live)
            }
            Ok(Ok(raw)) => {
                tracing::warn!(
                    router = live.name(),
                    "Malformed travel duration {}, using heuristic",
                    raw
                );
                Self::fallback(from, to, mode)
            }
            Ok(Err(e)) => {
                tracing::warn!(router = live.name(), "Live travel lookup failed: {}. Using heuristic", e);
                Self::fallback(from, to, mode)
            }
            Err(_) => {
                tracing::warn!(
                    router = live.name(),
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Live travel lookup timed out, using heuristic"
                );
                Self::fallback(from, to, mode)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryTravelCache;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRouter {
        minutes: f64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LiveRouter for FixedRouter {
        async fn route_minutes(&self, _: &Coordinates, _: &Coordinates, _: TravelMode) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.minutes)
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingRouter;

    #[async_trait]
    impl LiveRouter for FailingRouter {
        async fn route_minutes(&self, _: &Coordinates, _: &Coordinates, _: TravelMode) -> Result<f64> {
            Err(AppError::RoutingApi("unreachable".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct SlowRouter;

    #[async_trait]
    impl LiveRouter for SlowRouter {
        async fn route_minutes(&self, _: &Coordinates, _: &Coordinates, _: TravelMode) -> Result<f64> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1.0)
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn venue() -> Coordinates {
        Coordinates::new(40.7505, -73.9934).unwrap()
    }

    fn estimator(live: Option<Arc<dyn LiveRouter>>) -> FallbackEstimator {
        FallbackEstimator::new(
            live,
            Arc::new(MemoryTravelCache::new(60, 100)),
            Duration::from_millis(100),
        )
    }

    #[test]
    fn test_heuristic_three_miles_driving() {
        let hotel = venue().offset_north_miles(3.0);
        // round(3 / 22 * 60) = 8
        assert_eq!(heuristic_minutes(&hotel, &venue(), TravelMode::Driving), 8);
        // round(3 / 3 * 60) = 60
        assert_eq!(heuristic_minutes(&hotel, &venue(), TravelMode::Walking), 60);
    }

    #[test]
    fn test_heuristic_floor() {
        assert_eq!(heuristic_minutes(&venue(), &venue(), TravelMode::Driving), 4);
        let next_door = venue().offset_north_miles(0.1);
        assert_eq!(heuristic_minutes(&venue(), &next_door, TravelMode::Driving), 4);
    }

    #[tokio::test]
    async fn test_geometric_estimator_reports_heuristic() {
        let estimate = GeometricEstimator
            .estimate(&venue(), &venue().offset_north_miles(3.0), TravelMode::Driving)
            .await;
        assert_eq!(estimate, TravelEstimate::new(8, EstimateSource::Heuristic));
    }

    #[tokio::test]
    async fn test_no_live_router_uses_heuristic() {
        let estimator = estimator(None);

        let estimate = estimator
            .estimate(&venue(), &venue().offset_north_miles(3.0), TravelMode::Driving)
            .await;
        assert!(estimate.is_heuristic());
        assert_eq!(estimate.minutes, 8);
    }

    #[tokio::test]
    async fn test_live_then_cached() {
        let router = Arc::new(FixedRouter {
            minutes: 13.4,
            calls: AtomicUsize::new(0),
        });
        let estimator = estimator(Some(router.clone()));
        let hotel = venue().offset_north_miles(3.0);

        let first = estimator.estimate(&hotel, &venue(), TravelMode::Driving).await;
        assert_eq!(first, TravelEstimate::new(13, EstimateSource::Live));

        let second = estimator.estimate(&hotel, &venue(), TravelMode::Driving).await;
        assert_eq!(second, TravelEstimate::new(13, EstimateSource::Cached));
        assert_eq!(router.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_live_result_is_floored() {
        let router = Arc::new(FixedRouter {
            minutes: 1.2,
            calls: AtomicUsize::new(0),
        });
        let estimate = estimator(Some(router))
            .estimate(&venue(), &venue(), TravelMode::Walking)
            .await;
        assert_eq!(estimate.minutes, 4);
        assert_eq!(estimate.source, EstimateSource::Live);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_heuristic() {
        let estimator = estimator(Some(Arc::new(FailingRouter)));
        let hotel = venue().offset_north_miles(3.0);

        for mode in [TravelMode::Driving, TravelMode::Walking] {
            let estimate = estimator.estimate(&hotel, &venue(), mode).await;
            assert!(estimate.is_heuristic());
            assert!(estimate.minutes >= 4);
            assert_eq!(estimate.minutes, heuristic_minutes(&hotel, &venue(), mode));
        }
    }

    #[tokio::test]
    async fn test_malformed_live_result_falls_back() {
        let router = Arc::new(FixedRouter {
            minutes: f64::NAN,
            calls: AtomicUsize::new(0),
        });
        let estimate = estimator(Some(router))
            .estimate(&venue(), &venue().offset_north_miles(3.0), TravelMode::Driving)
            .await;
        assert_eq!(estimate, TravelEstimate::new(8, EstimateSource::Heuristic));
    }

    #[tokio::test]
    async fn test_implausibly_long_live_result_falls_back() {
        let router = Arc::new(FixedRouter {
            minutes: 1e15,
            calls: AtomicUsize::new(0),
        });
        let estimate = estimator(Some(router))
            .estimate(&venue(), &venue().offset_north_miles(3.0), TravelMode::Driving)
            .await;
        assert_eq!(estimate, TravelEstimate::new(8, EstimateSource::Heuristic));
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_heuristic() {
        let estimate = estimator(Some(Arc::new(SlowRouter)))
            .estimate(&venue(), &venue().offset_north_miles(3.0), TravelMode::Driving)
            .await;
        assert_eq!(estimate, TravelEstimate::new(8, EstimateSource::Heuristic));
    }
}
