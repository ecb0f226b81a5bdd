use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Place, PlaceCategory};
use crate::services::candidate_ranker::PlaceSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Public Overpass endpoints, tried round-robin
const OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

const METERS_PER_MILE: f64 = 1609.344;

#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoints: Vec<String>,
    current_endpoint_idx: Arc<AtomicUsize>,
}

impl OverpassClient {
    pub fn new() -> Self {
        Self::with_endpoints(OVERPASS_ENDPOINTS.iter().map(|s| s.to_string()).collect())
    }

    /// Client pinned to a single interpreter URL (self-hosted or proxy)
    pub fn with_url(url: String) -> Self {
        Self::with_endpoints(vec![url])
    }

    fn with_endpoints(endpoints: Vec<String>) -> Self {
        OverpassClient {
            client: Client::new(),
            endpoints,
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the next endpoint to try (round-robin)
    fn get_next_endpoint(&self) -> &str {
        let idx = self.current_endpoint_idx.fetch_add(1, Ordering::Relaxed);
        &self.endpoints[idx % self.endpoints.len()]
    }

    /// Named dining and attraction places around a point
    pub async fn query_places(
        &self,
        center: &Coordinates,
        radius_meters: f64,
        categories: &[PlaceCategory],
    ) -> Result<Vec<Place>> {
        let places = if categories.len() > 1 {
            self.query_places_batched(center, radius_meters, categories)
                .await?
        } else {
            let query = build_query(center, radius_meters, categories);
            tracing::debug!("Overpass query: {}", query);
            self.execute_query_with_retry(&query, OVERPASS_RETRY_MAX_ATTEMPTS)
                .await?
        };

        // An element can match on a secondary tag
        let wanted: HashSet<PlaceCategory> = categories.iter().copied().collect();
        Ok(places
            .into_iter()
            .filter(|p| wanted.contains(&p.category))
            .collect())
    }

    /// One query per category, run in parallel. Succeeds if any batch does.
    async fn query_places_batched(
        &self,
        center: &Coordinates,
        radius_meters: f64,
        categories: &[PlaceCategory],
    ) -> Result<Vec<Place>> {
        let batch_futures = categories.iter().map(|category| async move {
            let query = build_query(center, radius_meters, std::slice::from_ref(category));
            let result = self
                .execute_query_with_retry(&query, OVERPASS_RETRY_MAX_ATTEMPTS)
                .await;
            (*category, result)
        });
        let results = futures::future::join_all(batch_futures).await;

        let mut all_places = Vec::new();
        let mut successful_batches = 0;
        for (category, result) in results {
            match result {
                Ok(mut places) => {
                    successful_batches += 1;
                    tracing::debug!("Overpass batch {} returned {} places", category, places.len());
                    all_places.append(&mut places);
                }
                Err(e) => tracing::warn!("Overpass batch {} failed: {}", category, e),
            }
        }

        if successful_batches == 0 {
            return Err(AppError::PlacesApi("All batches failed".to_string()));
        }

        // Deduplicate by OSM ID across batches
        let mut seen_ids = HashSet::new();
        Ok(all_places
            .into_iter()
            .filter(|place| place.osm_id.map_or(true, |id| seen_ids.insert(id)))
            .collect())
    }

    /// POST the query, retrying timeouts, 429 and 504 with exponential backoff
    async fn execute_query_with_retry(&self, query: &str, max_retries: usize) -> Result<Vec<Place>> {
        let mut retry_count = 0;

        loop {
            let endpoint = self.get_next_endpoint();

            let response = self
                .client
                .post(endpoint)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(format!("data={}", urlencoding::encode(query)))
                .timeout(std::time::Duration::from_secs(OVERPASS_QUERY_TIMEOUT_SECONDS))
                .send()
                .await;

            let response = match response {
                Ok(resp) => resp,
                Err(e) => {
                    let error_msg = if e.is_timeout() {
                        "Request timed out".to_string()
                    } else {
                        format!("Request failed: {}", e)
                    };

                    if retry_count < max_retries {
                        retry_count += 1;
                        let backoff_ms = 1000 * 2_u64.pow(retry_count as u32);
                        tracing::warn!(
                            "Overpass {} ({}), retrying in {}ms (attempt {}/{})",
                            error_msg,
                            endpoint,
                            backoff_ms,
                            retry_count + 1,
                            max_retries + 1
                        );
                        tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                        continue;
                    }
                    return Err(AppError::PlacesApi(format!(
                        "{} after {} attempts",
                        error_msg,
                        max_retries + 1
                    )));
                }
            };

            let status = response.status();
            if status.is_success() {
                let api_response: OverpassResponse = response.json().await.map_err(|e| {
                    AppError::PlacesApi(format!("Failed to parse Overpass response: {}", e))
                })?;
                return Ok(convert_elements(api_response.elements));
            }

            let is_retryable =
                status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::GATEWAY_TIMEOUT;
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if is_retryable && retry_count < max_retries {
                retry_count += 1;
                let backoff_ms = 1000 * 2_u64.pow(retry_count as u32);
                tracing::warn!(
                    "Overpass returned HTTP {}, retrying in {}ms (attempt {}/{})",
                    status,
                    backoff_ms,
                    retry_count + 1,
                    max_retries + 1
                );
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                continue;
            }

            return Err(AppError::PlacesApi(format!("HTTP {}: {}", status, error_text)));
        }
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaceSource for OverpassClient {
    async fn nearby(
        &self,
        center: &Coordinates,
        radius_miles: f64,
        categories: &[PlaceCategory],
    ) -> Result<Vec<Place>> {
        self.query_places(center, radius_miles * METERS_PER_MILE, categories)
            .await
    }

    fn name(&self) -> &'static str {
        "overpass"
    }
}

fn category_to_osm_tags(category: PlaceCategory) -> &'static [(&'static str, &'static str)] {
    match category {
        PlaceCategory::Restaurant => &[("amenity", "restaurant")],
        PlaceCategory::Cafe => &[("amenity", "cafe")],
        PlaceCategory::Bar => &[("amenity", "bar"), ("amenity", "pub")],
        PlaceCategory::Attraction => &[("tourism", "attraction")],
    }
}

fn build_query(center: &Coordinates, radius_meters: f64, categories: &[PlaceCategory]) -> String {
    let mut query_parts = vec![format!(
        "[out:json][timeout:{}][maxsize:536870912];(",
        OVERPASS_QUERY_TIMEOUT_SECONDS
    )];

    for category in categories {
        for (key, value) in category_to_osm_tags(*category) {
            query_parts.push(format!(
                r#"nwr["{}"="{}"]["name"](around:{:.0},{},{});"#,
                key, value, radius_meters, center.lat, center.lng
            ));
        }
    }

    query_parts.push(format!(");out center {};", OVERPASS_RESULT_LIMIT));
    query_parts.join("\n")
}

fn infer_category(tags: &HashMap<String, String>) -> Option<PlaceCategory> {
    let by_amenity = tags.get("amenity").and_then(|a| match a.as_str() {
        "restaurant" => Some(PlaceCategory::Restaurant),
        "cafe" => Some(PlaceCategory::Cafe),
        "bar" | "pub" => Some(PlaceCategory::Bar),
        _ => None,
    });

    by_amenity.or_else(|| match tags.get("tourism").map(String::as_str) {
        Some("attraction") => Some(PlaceCategory::Attraction),
        _ => None,
    })
}

/// `price_range` is free text in the wild; only `$`-style values are read
fn price_tier(tags: &HashMap<String, String>) -> Option<u8> {
    let raw = tags
        .get("price_range")
        .or_else(|| tags.get("price:range"))?
        .trim();
    let dollars = raw.chars().take_while(|c| *c == '$' || *c == '€' || *c == '£').count();
    if dollars == 0 || dollars != raw.chars().count() {
        return None;
    }
    Some(dollars.min(4) as u8)
}

fn convert_elements(elements: Vec<OverpassElement>) -> Vec<Place> {
    let mut seen = HashSet::new();

    elements
        .into_iter()
        .filter_map(|elem| {
            let (lat, lon) = match (elem.lat, elem.lon, &elem.center) {
                (Some(lat), Some(lon), _) => (lat, lon),
                (_, _, Some(center)) => (center.lat, center.lon),
                _ => return None,
            };

            if !seen.insert(elem.id) {
                return None;
            }

            let coords = Coordinates::new(lat, lon).ok()?;
            let name = elem.tags.get("name")?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let category = infer_category(&elem.tags)?;

            let mut place = Place::new(name, category, coords);
            place.osm_id = Some(elem.id);
            place.url = elem
                .tags
                .get("website")
                .or_else(|| elem.tags.get("contact:website"))
                .cloned();
            place.opening_hours = elem.tags.get("opening_hours").cloned();
            place.price_tier = price_tier(&elem.tags);
            place.cuisine = elem
                .tags
                .get("cuisine")
                .map(|c| {
                    c.split(';')
                        .map(|s| s.trim().replace('_', " "))
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            Some(place)
        })
        .collect()
}

// Overpass API response types

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: i64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}
