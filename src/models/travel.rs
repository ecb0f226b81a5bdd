use crate::constants::{DRIVING_SPEED_MPH, WALKING_SPEED_MPH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
}

impl TravelMode {
    /// Returns the Mapbox profile name for this travel mode
    pub fn mapbox_profile(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
        }
    }

    /// Average door-to-door speed the geometric heuristic assumes
    pub fn assumed_speed_mph(&self) -> f64 {
        match self {
            TravelMode::Driving => DRIVING_SPEED_MPH,
            TravelMode::Walking => WALKING_SPEED_MPH,
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mapbox_profile())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(TravelMode::Driving),
            "walking" | "walk" => Ok(TravelMode::Walking),
            _ => Err(format!("Invalid travel mode: '{}'", s)),
        }
    }
}

/// Where a travel duration came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Live,
    Cached,
    Heuristic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TravelEstimate {
    pub minutes: u32,
    pub source: EstimateSource,
}

impl TravelEstimate {
    pub fn new(minutes: u32, source: EstimateSource) -> Self {
        TravelEstimate { minutes, source }
    }

    pub fn is_heuristic(&self) -> bool {
        self.source == EstimateSource::Heuristic
    }
}
