use super::anchors::AnchorTimes;
use super::legs::LegTimer;
use crate::config::{EngineVariant, PlannerConfig};
use crate::models::{AfterShowKind, Anchor, Event, EventKind, Preferences, ScheduleConfiguration};
use time::Duration;

fn dwell_minutes(kind: AfterShowKind, config: &PlannerConfig) -> i64 {
    match kind {
        AfterShowKind::Dinner => config.post_dinner_dwell_min,
        AfterShowKind::Drinks => config.post_drinks_dwell_min,
        AfterShowKind::Coffee => config.post_coffee_dwell_min,
    }
}

fn pick_title(kind: AfterShowKind, name: &str) -> String {
    match kind {
        AfterShowKind::Dinner => format!("Late dinner at {}", name),
        AfterShowKind::Drinks => format!("Drinks at {}", name),
        AfterShowKind::Coffee => format!("Coffee at {}", name),
    }
}

fn generic_title(prefs: &Preferences) -> &'static str {
    if prefs.dine.includes_after() {
        "After-show dinner"
    } else if prefs.drinks.includes_after() {
        "After-show drinks"
    } else {
        "After-show coffee"
    }
}

/// Build the post-show tail forward from the end of the show
pub(super) async fn build(
    request: &ScheduleConfiguration,
    venue: &Anchor,
    times: &AnchorTimes,
    config: &PlannerConfig,
    legs: &mut LegTimer<'_>,
    events: &mut Vec<Event>,
) {
    let prefs = &request.prefs;
    let wants_post =
        prefs.dine.includes_after() || prefs.drinks.includes_after() || prefs.coffee.includes_after();

    // The return leg leaves the venue at show end + return offset when
    // nothing follows the show. With a post-show block it leaves that
    // block's place when the block ends, so the two never overlap.
    let mut last_place = venue;
    let mut free_at = times.show_end + Duration::minutes(config.return_leg_offset_min);

    if wants_post {
        let depart = times.show_end + Duration::minutes(config.post_show_exit_min);

        match (&request.picks.after, config.variant) {
            (Some(pick), EngineVariant::Estimated) => {
                let leg = legs.estimated(venue, &pick.anchor).await;
                let arrive = depart + leg;
                events.push(
                    Event::interval(
                        EventKind::PostMove,
                        format!("Head to {}", pick.anchor.name),
                        depart,
                        arrive,
                    )
                    .with_details(format!("{} min from {}", leg.whole_minutes(), venue.name))
                    .with_url(pick.anchor.map_url.clone()),
                );

                let end = arrive + Duration::minutes(dwell_minutes(pick.kind, config));
                events.push(
                    Event::interval(
                        EventKind::Post,
                        pick_title(pick.kind, &pick.anchor.name),
                        arrive,
                        end,
                    )
                    .with_details(pick.anchor.note.clone().unwrap_or_default())
                    .with_url(pick.anchor.link()),
                );

                last_place = &pick.anchor;
                free_at = end;
            }
            (Some(pick), EngineVariant::Fixed) => {
                let end = depart + Duration::minutes(config.post_window_min);
                events.push(
                    Event::interval(
                        EventKind::Post,
                        pick_title(pick.kind, &pick.anchor.name),
                        depart,
                        end,
                    )
                    .with_details(pick.anchor.note.clone().unwrap_or_default())
                    .with_url(pick.anchor.link()),
                );

                last_place = &pick.anchor;
                free_at = end;
            }
            (None, _) => {
                let end = depart + Duration::minutes(config.post_window_min);
                events.push(
                    Event::interval(EventKind::Post, generic_title(prefs), depart, end)
                        .with_details(format!("Near {}", venue.name)),
                );
                free_at = end;
            }
        }
    }

    if let Some(hotel) = &request.hotel {
        let leg = legs.estimated(last_place, hotel).await;
        events.push(
            Event::interval(
                EventKind::PostLeave,
                format!("Return to {}", hotel.name),
                free_at,
                free_at + leg,
            )
            .with_details(format!("{} min from {}", leg.whole_minutes(), last_place.name))
            .with_url(hotel.map_url.clone()),
        );
    }
}
