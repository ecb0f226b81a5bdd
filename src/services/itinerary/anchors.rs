use crate::constants::{MIN_ARRIVAL_BUFFER_MIN, MIN_DOORS_BEFORE_MIN, MIN_SHOW_DURATION_MIN};
use crate::models::{Preferences, ShowTiming};
use time::{Duration, OffsetDateTime};

/// The fixed points every schedule hangs off, all derived from the show start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorTimes {
    pub show_start: OffsetDateTime,
    pub show_end: OffsetDateTime,
    pub doors_open: OffsetDateTime,
    /// Latest instant the attendee may reach the venue
    pub must_arrive_by: OffsetDateTime,
}

impl AnchorTimes {
    /// `None` when a derived instant falls outside the representable range
    pub fn derive(
        show: &ShowTiming,
        prefs: &Preferences,
        show_start: OffsetDateTime,
    ) -> Option<Self> {
        let duration = show.duration_min.max(MIN_SHOW_DURATION_MIN);
        let doors_before = show.doors_before_min.max(MIN_DOORS_BEFORE_MIN);
        let arrival_buffer = prefs.arrival_buffer_min.max(MIN_ARRIVAL_BUFFER_MIN);

        Some(AnchorTimes {
            show_start,
            show_end: show_start.checked_add(Duration::minutes(duration))?,
            doors_open: show_start.checked_sub(Duration::minutes(doors_before))?,
            must_arrive_by: show_start.checked_sub(Duration::minutes(arrival_buffer))?,
        })
    }
}
