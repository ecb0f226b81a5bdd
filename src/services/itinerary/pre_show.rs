use super::anchors::AnchorTimes;
use super::legs::LegTimer;
use crate::config::PlannerConfig;
use crate::models::{Anchor, Event, EventKind, ScheduleConfiguration};
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Dinner,
    Drinks,
    Coffee,
    Stop,
}

/// A requested pre-show block at a physical location
struct PreShowBlock<'a> {
    anchor: &'a Anchor,
    kind: BlockKind,
    duration: Duration,
}

impl PreShowBlock<'_> {
    fn event(&self, start: OffsetDateTime, end: OffsetDateTime) -> Event {
        let (kind, title) = match self.kind {
            BlockKind::Dinner => (EventKind::Dine, format!("Dinner at {}", self.anchor.name)),
            BlockKind::Drinks => (EventKind::Activity, format!("Drinks at {}", self.anchor.name)),
            BlockKind::Coffee => (EventKind::Activity, format!("Coffee at {}", self.anchor.name)),
            BlockKind::Stop => (EventKind::Anchor, self.anchor.name.clone()),
        };

        Event::interval(kind, title, start, end)
            .with_details(self.anchor.note.clone().unwrap_or_default())
            .with_url(self.anchor.link())
    }
}

/// Requested blocks ordered nearest-to-arrival first: dinner, drinks,
/// coffee, then custom stops from last-listed to first-listed so the stops
/// are visited in the order given.
fn requested_blocks<'a>(
    request: &'a ScheduleConfiguration,
    config: &PlannerConfig,
) -> Vec<PreShowBlock<'a>> {
    let prefs = &request.prefs;
    let picks = &request.picks;
    let mut blocks = Vec::new();

    let fixed = [
        (&picks.dinner, prefs.dine, BlockKind::Dinner, config.dinner_duration_min),
        (&picks.drinks, prefs.drinks, BlockKind::Drinks, config.drinks_duration_min),
        (&picks.coffee, prefs.coffee, BlockKind::Coffee, config.coffee_duration_min),
    ];
    for (pick, slot, kind, minutes) in fixed {
        if let Some(anchor) = pick {
            if slot.includes_before() {
                blocks.push(PreShowBlock {
                    anchor,
                    kind,
                    duration: Duration::minutes(minutes),
                });
            }
        }
    }

    for stop in picks.stops.iter().rev() {
        blocks.push(PreShowBlock {
            anchor: &stop.anchor,
            kind: BlockKind::Stop,
            duration: Duration::minutes(stop.duration_min),
        });
    }

    blocks
}

/// Lay out everything before arrival by working backward from the arrival
/// deadline: each block ends where its leg to the next location begins,
/// and the hotel departure ends where the earliest block begins.
pub(super) async fn build(
    request: &ScheduleConfiguration,
    venue: &Anchor,
    times: &AnchorTimes,
    config: &PlannerConfig,
    legs: &mut LegTimer<'_>,
    events: &mut Vec<Event>,
) {
    let blocks = requested_blocks(request, config);

    let mut cursor = times.must_arrive_by;
    let mut next = venue;
    let mut next_is_dinner = false;

    for block in &blocks {
        let leg = legs.between(block.anchor, next).await;
        let leave = cursor - leg;

        let leg_kind = if block.kind == BlockKind::Dinner {
            EventKind::DineLeave
        } else if next_is_dinner {
            EventKind::DineArrive
        } else {
            EventKind::Travel
        };
        events.push(
            Event::interval(leg_kind, format!("Head to {}", next.name), leave, cursor)
                .with_details(format!(
                    "{} min from {}",
                    leg.whole_minutes(),
                    block.anchor.name
                ))
                .with_url(next.map_url.clone()),
        );

        let start = leave - block.duration;
        events.push(block.event(start, leave));

        cursor = start;
        next = block.anchor;
        next_is_dinner = block.kind == BlockKind::Dinner;
    }

    if let Some(hotel) = &request.hotel {
        let leg = legs.from_hotel(hotel, next, blocks.is_empty()).await;
        events.push(
            Event::interval(
                EventKind::HotelDepart,
                format!("Leave {}", hotel.name),
                cursor - leg,
                cursor,
            )
            .with_details(format!("Head to {}", next.name))
            .with_url(next.map_url.clone()),
        );
    }

    tracing::debug!(
        blocks = blocks.len(),
        hotel = request.hotel.is_some(),
        "Pre-show chain starts at {}",
        cursor
    );
}
