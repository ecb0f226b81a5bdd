use crate::config::{EngineVariant, PlannerConfig};
use crate::constants::MAX_TRAVEL_MINUTES;
use crate::models::{Anchor, Completeness, TravelMode};
use crate::services::travel_estimator::TravelEstimator;
use time::Duration;

/// Times travel legs under the active engine variant and remembers whether
/// any of them had to fall back to the heuristic.
pub(super) struct LegTimer<'a> {
    estimator: &'a dyn TravelEstimator,
    config: &'a PlannerConfig,
    mode: TravelMode,
    travel: Completeness,
}

impl<'a> LegTimer<'a> {
    pub fn new(
        estimator: &'a dyn TravelEstimator,
        config: &'a PlannerConfig,
        mode: TravelMode,
    ) -> Self {
        Self {
            estimator,
            config,
            mode,
            travel: Completeness::Complete,
        }
    }

    pub fn completeness(&self) -> Completeness {
        self.travel
    }

    /// Estimated door-to-door time: raw estimate plus the fixed leg overhead
    pub async fn estimated(&mut self, from: &Anchor, to: &Anchor) -> Duration {
        let estimate = self
            .estimator
            .estimate(&from.coordinates, &to.coordinates, self.mode)
            .await;
        if estimate.is_heuristic() {
            self.travel = Completeness::Degraded;
        }

        let minutes =
            i64::from(estimate.minutes.min(MAX_TRAVEL_MINUTES)) + self.config.leg_overhead_min;
        tracing::debug!(
            from = %from.name,
            to = %to.name,
            source = ?estimate.source,
            "Leg {} -> {}: {}min + {}min overhead",
            from.name, to.name, estimate.minutes, self.config.leg_overhead_min
        );
        Duration::minutes(minutes)
    }

    /// Leg between two pre-show locations
    pub async fn between(&mut self, from: &Anchor, to: &Anchor) -> Duration {
        match self.config.variant {
            EngineVariant::Estimated => self.estimated(from, to).await,
            EngineVariant::Fixed => Duration::minutes(self.config.travel_pad_min),
        }
    }

    /// Leg out of the hotel. Under the fixed variant this is a getting-ready
    /// buffer when something is scheduled before the venue, or a direct
    /// hotel-to-venue budget otherwise.
    pub async fn from_hotel(&mut self, hotel: &Anchor, to: &Anchor, direct: bool) -> Duration {
        match self.config.variant {
            EngineVariant::Estimated => self.estimated(hotel, to).await,
            EngineVariant::Fixed if direct => Duration::minutes(
                self.config
                    .direct_hotel_leg_min
                    .max(self.config.travel_pad_min),
            ),
            EngineVariant::Fixed => Duration::minutes(self.config.getting_ready_min),
        }
    }
}
