use crate::constants::{
    DEFAULT_ARRIVAL_BUFFER_MIN, DEFAULT_DOORS_BEFORE_MIN, DEFAULT_SHOW_DURATION_MIN,
    DEFAULT_STOP_DURATION_MIN, MAX_CUSTOM_STOPS, MAX_SHOW_YEAR, MAX_TIMING_MIN, MIN_SHOW_YEAR,
};
use crate::models::{Anchor, TravelMode};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Which side of the show a block belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlotPreference {
    #[default]
    None,
    Before,
    After,
    Both,
}

impl SlotPreference {
    pub fn includes_before(&self) -> bool {
        matches!(self, SlotPreference::Before | SlotPreference::Both)
    }

    pub fn includes_after(&self) -> bool {
        matches!(self, SlotPreference::After | SlotPreference::Both)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShowTiming {
    #[serde(rename = "startISO", default)]
    pub start_iso: String,
    #[serde(default = "default_show_duration")]
    pub duration_min: i64,
    #[serde(default = "default_doors_before")]
    pub doors_before_min: i64,
    /// Offset applied when `startISO` carries no offset of its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_min: Option<i32>,
}

fn default_show_duration() -> i64 {
    DEFAULT_SHOW_DURATION_MIN
}

fn default_doors_before() -> i64 {
    DEFAULT_DOORS_BEFORE_MIN
}

fn default_arrival_buffer() -> i64 {
    DEFAULT_ARRIVAL_BUFFER_MIN
}

fn default_stop_duration() -> i64 {
    DEFAULT_STOP_DURATION_MIN
}

impl ShowTiming {
    pub fn new(start_iso: impl Into<String>) -> Self {
        ShowTiming {
            start_iso: start_iso.into(),
            duration_min: DEFAULT_SHOW_DURATION_MIN,
            doors_before_min: DEFAULT_DOORS_BEFORE_MIN,
            utc_offset_min: None,
        }
    }

    /// Parse `startISO`. RFC 3339 strings keep their own offset; local
    /// `YYYY-MM-DDTHH:MM[:SS]` strings take `utcOffsetMin` (UTC if unset).
    pub fn start(&self) -> Result<OffsetDateTime, String> {
        let raw = self.start_iso.trim();
        if raw.is_empty() {
            return Err("show.startISO is required".to_string());
        }

        if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Ok(instant);
        }

        let local = PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
        .or_else(|_| {
            PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        })
        .map_err(|e| format!("Invalid show.startISO '{}': {}", raw, e))?;

        let offset_seconds = self
            .utc_offset_min
            .unwrap_or(0)
            .checked_mul(60)
            .ok_or_else(|| "show.utcOffsetMin is out of range".to_string())?;
        let offset = UtcOffset::from_whole_seconds(offset_seconds)
            .map_err(|e| format!("Invalid show.utcOffsetMin: {}", e))?;

        Ok(local.assume_offset(offset))
    }
}

/// Short fixed activities hung off the doors-open time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DoorsExtras {
    #[serde(default)]
    pub merch: bool,
    #[serde(default)]
    pub concessions: bool,
    #[serde(default)]
    pub hydration: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_arrival_buffer")]
    pub arrival_buffer_min: i64,
    #[serde(default)]
    pub dine: SlotPreference,
    #[serde(default)]
    pub drinks: SlotPreference,
    #[serde(default)]
    pub coffee: SlotPreference,
    #[serde(default)]
    pub mode: TravelMode,
    #[serde(default)]
    pub doors_extras: DoorsExtras,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            arrival_buffer_min: DEFAULT_ARRIVAL_BUFFER_MIN,
            dine: SlotPreference::None,
            drinks: SlotPreference::None,
            coffee: SlotPreference::None,
            mode: TravelMode::default(),
            doors_extras: DoorsExtras::default(),
        }
    }
}

/// A personal must-visit stop fitted in before the show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomStop {
    #[serde(flatten)]
    pub anchor: Anchor,
    #[serde(default = "default_stop_duration")]
    pub duration_min: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Picks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<Anchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drinks: Option<Anchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coffee: Option<Anchor>,
    /// Where to go once the show lets out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<AfterShowPick>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stops: Vec<CustomStop>,
}

/// Class of the post-show destination; decides the dwell time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AfterShowKind {
    #[default]
    Dinner,
    Drinks,
    Coffee,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AfterShowPick {
    #[serde(flatten)]
    pub anchor: Anchor,
    #[serde(default)]
    pub kind: AfterShowKind,
}

/// Everything one planning request needs. Built fresh per request and
/// consumed read-only by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfiguration {
    pub show: ShowTiming,
    #[serde(default)]
    pub prefs: Preferences,
    #[serde(default)]
    pub venue: Option<Anchor>,
    #[serde(default)]
    pub hotel: Option<Anchor>,
    #[serde(default)]
    pub picks: Picks,
}

impl ScheduleConfiguration {
    pub fn new(start_iso: impl Into<String>, venue: Anchor) -> Self {
        ScheduleConfiguration {
            show: ShowTiming::new(start_iso),
            prefs: Preferences::default(),
            venue: Some(venue),
            hotel: None,
            picks: Picks::default(),
        }
    }

    /// Check the fields the engine cannot work without, plus the
    /// coordinates of every anchor that is present.
    pub fn validate(&self) -> Result<(&Anchor, OffsetDateTime), String> {
        let venue = self
            .venue
            .as_ref()
            .ok_or_else(|| "venue is required".to_string())?;
        venue.validate("venue")?;

        let start = self.show.start()?;
        if !(MIN_SHOW_YEAR..=MAX_SHOW_YEAR).contains(&start.year()) {
            return Err(format!(
                "show.startISO must fall between years {} and {}",
                MIN_SHOW_YEAR, MAX_SHOW_YEAR
            ));
        }

        // Values below the floors are raised later; only the ceiling is checked here
        for (field, value) in [
            ("show.durationMin", self.show.duration_min),
            ("show.doorsBeforeMin", self.show.doors_before_min),
            ("prefs.arrivalBufferMin", self.prefs.arrival_buffer_min),
        ] {
            if value > MAX_TIMING_MIN {
                return Err(format!("{} must be at most {}", field, MAX_TIMING_MIN));
            }
        }

        if let Some(hotel) = &self.hotel {
            hotel.validate("hotel")?;
        }
        for (role, pick) in [
            ("dinner pick", &self.picks.dinner),
            ("drinks pick", &self.picks.drinks),
            ("coffee pick", &self.picks.coffee),
        ] {
            if let Some(anchor) = pick {
                anchor.validate(role)?;
            }
        }
        if let Some(after) = &self.picks.after {
            after.anchor.validate("after-show pick")?;
        }
        if self.picks.stops.len() > MAX_CUSTOM_STOPS {
            return Err(format!("at most {} stops are supported", MAX_CUSTOM_STOPS));
        }
        for stop in &self.picks.stops {
            stop.anchor.validate("stop")?;
            if !(1..=MAX_TIMING_MIN).contains(&stop.duration_min) {
                return Err(format!(
                    "stop '{}' durationMin must be between 1 and {}",
                    stop.anchor.name, MAX_TIMING_MIN
                ));
            }
        }

        Ok((venue, start))
    }
}
