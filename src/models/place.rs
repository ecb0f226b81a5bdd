use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MAP_SEARCH_BASE_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Restaurant,
    Cafe,
    Bar,
    Attraction,
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Cafe => "cafe",
            PlaceCategory::Bar => "bar",
            PlaceCategory::Attraction => "attraction",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PlaceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "restaurant" | "dinner" => Ok(PlaceCategory::Restaurant),
            "cafe" | "coffee" => Ok(PlaceCategory::Cafe),
            "bar" | "pub" | "drinks" => Ok(PlaceCategory::Bar),
            "attraction" => Ok(PlaceCategory::Attraction),
            _ => Err(format!("Invalid place category: {}", s)),
        }
    }
}

/// A place proposed by discovery, before ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub category: PlaceCategory,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub map_url: String,
    /// 1 ($) to 4 ($$$$)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_tier: Option<u8>,
    /// 0.0 to 5.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub cuisine: Vec<String>,
    /// Raw OSM `opening_hours` value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osm_id: Option<i64>,
}

impl Place {
    pub fn new(name: String, category: PlaceCategory, coordinates: Coordinates) -> Self {
        let map_url = map_search_url(&name, &coordinates);
        Place {
            id: Uuid::new_v4(),
            name,
            category,
            coordinates,
            url: None,
            map_url,
            price_tier: None,
            rating: None,
            review_count: None,
            cuisine: Vec::new(),
            opening_hours: None,
            osm_id: None,
        }
    }
}

/// Map search link for a name at a location
pub fn map_search_url(name: &str, coordinates: &Coordinates) -> String {
    let query = format!("{} {:.6},{:.6}", name, coordinates.lat, coordinates.lng);
    format!("{}{}", MAP_SEARCH_BASE_URL, urlencoding::encode(&query))
}

/// A ranked candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPlace {
    #[serde(flatten)]
    pub place: Place,
    pub distance_miles: f64,
    pub score: f64,
    /// `None` when opening hours are unknown or unparseable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_at_target_instant: Option<bool>,
}
