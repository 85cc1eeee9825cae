use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GeocoderConfig;
use crate::models::Location;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No geocoding results for {0}")]
    NoResults(String),

    #[error("Geocoder is not configured")]
    NotConfigured,

    #[error("Geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Turns a free-form address or zipcode into a located point.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError>;
}

/// MapQuest-compatible `geocoding/v1/address` client.
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    #[serde(default)]
    street: String,
    /// City
    #[serde(default)]
    admin_area5: String,
    /// State code
    #[serde(default)]
    admin_area3: String,
    /// Country code
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
    lat_lng: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(s: String) -> Option<String> {
    (!s.trim().is_empty()).then_some(s)
}

impl From<MapQuestLocation> for Location {
    fn from(found: MapQuestLocation) -> Self {
        let state_zip = format!("{} {}", found.admin_area3, found.postal_code);
        let formatted = [
            found.street.as_str(),
            found.admin_area5.as_str(),
            state_zip.as_str(),
            found.admin_area1.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        let mut location = Location::point(found.lat_lng.lng, found.lat_lng.lat);
        location.formatted_address = non_empty(formatted);
        location.street = non_empty(found.street);
        location.city = non_empty(found.admin_area5);
        location.state = non_empty(found.admin_area3);
        location.zipcode = non_empty(found.postal_code);
        location.country = non_empty(found.admin_area1);
        location
    }
}

impl MapQuestGeocoder {
    pub fn new(config: &GeocoderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError> {
        if self.api_key.is_empty() {
            return Err(GeocodeError::NotConfigured);
        }
        let response: MapQuestResponse = self
            .client
            .get(&self.endpoint)
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let found = response
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .next()
            .ok_or_else(|| GeocodeError::NoResults(address.to_string()))?;
        tracing::debug!(address, lat = found.lat_lng.lat, lng = found.lat_lng.lng, "geocoded address");
        Ok(found.into())
    }
}
