mod anchors;
mod doors;
mod legs;
mod post_show;
mod pre_show;

pub use anchors::AnchorTimes;

use crate::config::PlannerConfig;
use crate::error::{AppError, Result};
use crate::models::{Event, EventKind, Itinerary, ScheduleConfiguration};
use crate::services::travel_estimator::TravelEstimator;
use legs::LegTimer;
use std::sync::Arc;

/// Builds one concert evening from a schedule configuration.
///
/// Everything hangs off the show start: the pre-show chain is built
/// backward from the arrival deadline, the doors notices are pinned to
/// the doors-open time, and the post-show tail runs forward from the end
/// of the show. The engine holds no per-request state, so the same
/// configuration always yields the same itinerary for a deterministic
/// estimator.
pub struct ItineraryEngine {
    estimator: Arc<dyn TravelEstimator>,
    config: PlannerConfig,
}

impl ItineraryEngine {
    pub fn new(estimator: Arc<dyn TravelEstimator>, config: PlannerConfig) -> Self {
        ItineraryEngine { estimator, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub async fn schedule(&self, request: &ScheduleConfiguration) -> Result<Itinerary> {
        let (venue, show_start) = request
            .validate()
            .map_err(AppError::InvalidConfiguration)?;

        let times = AnchorTimes::derive(&request.show, &request.prefs, show_start).ok_or_else(
            || AppError::InvalidConfiguration("show timing is out of range".to_string()),
        )?;
        let mut legs = LegTimer::new(self.estimator.as_ref(), &self.config, request.prefs.mode);
        let mut events = Vec::new();

        pre_show::build(request, venue, &times, &self.config, &mut legs, &mut events).await;

        events.push(
            Event::notice(
                EventKind::ArriveVenue,
                format!("Arrive at {}", venue.name),
                times.must_arrive_by,
            )
            .with_details(format!(
                "{} min before showtime",
                (times.show_start - times.must_arrive_by).whole_minutes()
            ))
            .with_url(venue.link()),
        );

        doors::build(&times, &request.prefs.doors_extras, &mut events);

        events.push(
            Event::interval(EventKind::Show, "Showtime", times.show_start, times.show_end)
                .with_details(venue.name.clone())
                .with_url(venue.url.clone()),
        );

        post_show::build(request, venue, &times, &self.config, &mut legs, &mut events).await;

        // Stable: events sharing a start keep construction order
        events.sort_by_key(|event| event.start);

        let travel = legs.completeness();
        tracing::info!(
            venue = %venue.name,
            events = events.len(),
            travel = ?travel,
            "Scheduled evening for show at {}",
            times.show_start
        );

        Ok(Itinerary { events, travel })
    }
}
