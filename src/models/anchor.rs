use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// A named point of interest used as a schedule reference point: the venue,
/// the hotel, or the place chosen for a pre/post-show block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub name: String,
    #[serde(alias = "coordinate")]
    pub coordinates: Coordinates,
    /// Booking or info link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Anchor {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Anchor {
            name: name.into(),
            coordinates,
            url: None,
            map_url: None,
            note: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Link to surface on an event: the booking URL if there is one,
    /// otherwise the map link.
    pub fn link(&self) -> Option<String> {
        self.url.clone().or_else(|| self.map_url.clone())
    }

    pub fn validate(&self, role: &str) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("{} name must not be empty", role));
        }
        self.coordinates
            .validate()
            .map_err(|e| format!("{} {}", role, e))
    }
}
