use super::anchors::AnchorTimes;
use crate::constants::{CONCESSIONS_WINDOW_MIN, HYDRATION_WINDOW_MIN, MERCH_WINDOW_MIN};
use crate::models::{DoorsExtras, Event, EventKind};
use time::Duration;

/// Doors-open notice plus the optional short activities pinned to it.
/// These never move to make room for anything else.
pub(super) fn build(times: &AnchorTimes, extras: &DoorsExtras, events: &mut Vec<Event>) {
    events.push(Event::notice(EventKind::Note, "Doors open", times.doors_open));

    let windows = [
        (extras.merch, "Merch hunt", MERCH_WINDOW_MIN),
        (extras.concessions, "Concessions", CONCESSIONS_WINDOW_MIN),
        (extras.hydration, "Hydrate", HYDRATION_WINDOW_MIN),
    ];

    for (enabled, title, (from, to)) in windows {
        if enabled {
            events.push(Event::interval(
                EventKind::Activity,
                title,
                times.doors_open + Duration::minutes(from),
                times.doors_open + Duration::minutes(to),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preferences, ShowTiming};
    use time::macros::datetime;

    fn times() -> AnchorTimes {
        AnchorTimes::derive(
            &ShowTiming::new("2025-06-01T19:00:00"),
            &Preferences::default(),
            datetime!(2025-06-01 19:00 UTC),
        )
        .unwrap()
    }

    #[test]
    fn test_notice_only_by_default() {
        let mut events = Vec::new();
        build(&times(), &DoorsExtras::default(), &mut events);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Note);
        assert_eq!(events[0].start, datetime!(2025-06-01 17:30 UTC));
        assert!(events[0].is_notice());
    }

    #[test]
    fn test_extras_at_fixed_offsets() {
        let extras = DoorsExtras {
            merch: true,
            concessions: true,
            hydration: true,
        };
        let mut events = Vec::new();
        build(&times(), &extras, &mut events);

        let spans: Vec<_> = events[1..].iter().map(|e| (e.start, e.end)).collect();
        assert_eq!(
            spans,
            vec![
                (datetime!(2025-06-01 17:30 UTC), datetime!(2025-06-01 17:50 UTC)),
                (datetime!(2025-06-01 17:50 UTC), datetime!(2025-06-01 18:05 UTC)),
                (datetime!(2025-06-01 18:05 UTC), datetime!(2025-06-01 18:10 UTC)),
            ]
        );
        assert!(events[1..].iter().all(|e| e.kind == EventKind::Activity));
    }
}
