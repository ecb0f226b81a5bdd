use crate::error::{AppError, Result};
use crate::models::{Coordinates, TravelMode};
use crate::services::travel_estimator::LiveRouter;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const MAPBOX_DIRECTIONS_BASE_URL: &str = "https://api.mapbox.com/directions/v5/mapbox";

/// How the client authenticates with the directions API.
#[derive(Clone, Debug)]
pub enum AuthMode {
    /// Current default: send `access_token` query param (direct Mapbox).
    DirectToken,
    /// Proxy mode: send `Authorization: Bearer` header.
    BearerHeader,
}

#[derive(Clone)]
pub struct MapboxClient {
    client: Client,
    api_key: String,
    base_url: String,
    auth_mode: AuthMode,
}

impl MapboxClient {
    pub fn new(api_key: String) -> Self {
        MapboxClient {
            client: Client::new(),
            api_key,
            base_url: MAPBOX_DIRECTIONS_BASE_URL.to_string(),
            auth_mode: AuthMode::DirectToken,
        }
    }

    pub fn with_config(api_key: String, base_url: String, auth_mode: AuthMode) -> Self {
        MapboxClient {
            client: Client::new(),
            api_key,
            base_url,
            auth_mode,
        }
    }

    fn leg_url(&self, from: &Coordinates, to: &Coordinates, mode: TravelMode) -> String {
        // Mapbox takes "lng,lat;lng,lat"
        format!(
            "{}/{}/{},{};{},{}",
            self.base_url,
            mode.mapbox_profile(),
            from.lng,
            from.lat,
            to.lng,
            to.lat
        )
    }

    /// Get a single leg between two points.
    /// Returns distance and duration only; no geometry is requested.
    pub async fn get_directions(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<DirectionsResponse> {
        let url = self.leg_url(from, to, mode);

        tracing::debug!(
            mode = %mode,
            "Mapbox API request: ({:.4}, {:.4}) -> ({:.4}, {:.4})",
            from.lat, from.lng, to.lat, to.lng
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("overview", "false"), ("steps", "false")]);

        match self.auth_mode {
            AuthMode::DirectToken => {
                request = request.query(&[("access_token", &self.api_key)]);
            }
            AuthMode::BearerHeader => {
                request = request.bearer_auth(&self.api_key);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, "Mapbox API HTTP error {}: {}", status, error_text);
            return Err(AppError::RoutingApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let directions: MapboxDirectionsApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Failed to parse response: {}", e)))?;

        DirectionsResponse::from_api(directions, mode)
    }
}

#[async_trait]
impl LiveRouter for MapboxClient {
    async fn route_minutes(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<f64> {
        let directions = self.get_directions(from, to, mode).await?;
        Ok(directions.duration_seconds / 60.0)
    }

    fn name(&self) -> &'static str {
        "mapbox"
    }
}

// Mapbox API response types

#[derive(Debug, Deserialize)]
struct MapboxDirectionsApiResponse {
    #[serde(default)]
    routes: Vec<MapboxRoute>,
    code: String,
}

#[derive(Debug, Deserialize)]
struct MapboxRoute {
    distance: f64, // meters
    duration: f64, // seconds
}

// Our simplified response type

#[derive(Debug, Clone, Serialize)]
pub struct DirectionsResponse {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl DirectionsResponse {
    fn from_api(api: MapboxDirectionsApiResponse, mode: TravelMode) -> Result<Self> {
        if api.code != "Ok" {
            return Err(AppError::RoutingApi(format!("Mapbox returned code {}", api.code)));
        }

        let route = api.routes.first().ok_or_else(|| {
            tracing::warn!(mode = %mode, "Mapbox returned 0 routes");
            AppError::RoutingApi("No routes found".to_string())
        })?;

        if !route.duration.is_finite() || route.duration < 0.0 {
            return Err(AppError::RoutingApi(format!(
                "Malformed duration: {}",
                route.duration
            )));
        }

        tracing::debug!(
            distance_km = %format!("{:.2}", route.distance / 1000.0),
            duration_min = %format!("{:.0}", route.duration / 60.0),
            "Mapbox response: {:.2}km, {:.0}min",
            route.distance / 1000.0, route.duration / 60.0
        );

        Ok(DirectionsResponse {
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds / 60.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<DirectionsResponse> {
        let api: MapboxDirectionsApiResponse = serde_json::from_str(json).unwrap();
        DirectionsResponse::from_api(api, TravelMode::Driving)
    }

    #[test]
    fn test_new_defaults_to_direct_token() {
        let client = MapboxClient::new("pk.test123".to_string());
        assert_eq!(client.base_url, MAPBOX_DIRECTIONS_BASE_URL);
        assert!(matches!(client.auth_mode, AuthMode::DirectToken));
    }

    #[test]
    fn test_with_config_bearer_mode() {
        let client = MapboxClient::with_config(
            "my-key".to_string(),
            "http://localhost:4000/v1/directions".to_string(),
            AuthMode::BearerHeader,
        );
        assert_eq!(client.base_url, "http://localhost:4000/v1/directions");
        assert!(matches!(client.auth_mode, AuthMode::BearerHeader));
    }

    #[test]
    fn test_leg_url_is_lng_lat() {
        let client = MapboxClient::new("pk".to_string());
        let from = Coordinates::new(40.7505, -73.9934).unwrap();
        let to = Coordinates::new(40.7580, -73.9855).unwrap();

        let url = client.leg_url(&from, &to, TravelMode::Walking);
        assert_eq!(
            url,
            format!(
                "{}/walking/-73.9934,40.7505;-73.9855,40.758",
                MAPBOX_DIRECTIONS_BASE_URL
            )
        );
    }

    #[test]
    fn test_parse_success() {
        let response =
            parse(r#"{"code": "Ok", "routes": [{"distance": 5240.0, "duration": 3720.0}]}"#)
                .unwrap();
        assert_eq!(response.distance_km(), 5.24);
        assert_eq!(response.duration_minutes(), 62);
    }

    #[test]
    fn test_parse_no_route_is_error() {
        assert!(parse(r#"{"code": "NoRoute", "routes": []}"#).is_err());
        assert!(parse(r#"{"code": "Ok", "routes": []}"#).is_err());
    }

    #[test]
    fn test_parse_negative_duration_is_error() {
        assert!(parse(r#"{"code": "Ok", "routes": [{"distance": 10.0, "duration": -5.0}]}"#).is_err());
    }
}
