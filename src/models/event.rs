use crate::models::Completeness;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Closed set of event tags. The engine instantiates a fixed template
/// (pre-show blocks, arrival, doors notices, show, post-show) with these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Note,
    Anchor,
    Activity,
    Travel,
    HotelDepart,
    Dine,
    DineArrive,
    DineLeave,
    ArriveVenue,
    Show,
    Post,
    PostMove,
    PostLeave,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Event {
    pub fn interval(
        kind: EventKind,
        title: impl Into<String>,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Self {
        Event {
            kind,
            title: title.into(),
            start,
            end,
            details: String::new(),
            url: None,
        }
    }

    /// Zero-duration notice
    pub fn notice(kind: EventKind, title: impl Into<String>, at: OffsetDateTime) -> Self {
        Self::interval(kind, title, at, at)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_notice(&self) -> bool {
        self.start == self.end
    }
}

/// The engine's output: events ordered by start, plus whether every travel
/// leg came from a live (or cached live) estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Itinerary {
    pub events: Vec<Event>,
    pub travel: Completeness,
}

impl Itinerary {
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn first_of(&self, kind: EventKind) -> Option<&Event> {
        self.events_of(kind).next()
    }
}
