use crate::config::GeocodingConfig;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, GeocodeResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Forward and reverse address resolution.
///
/// Both calls are fail-soft: a missing match, a transport error or an
/// unparseable body all come back as `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode_address(&self, address: &str) -> Option<GeocodeResult>;

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Option<String>;
}

/// Client for a Nominatim-compatible search service.
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    country_codes: String,
}

impl NominatimClient {
    pub fn new(base_url: String, country_codes: String, timeout: Duration) -> Result<Self> {
        Ok(NominatimClient {
            client: super::http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            country_codes,
        })
    }

    pub fn from_config(config: &GeocodingConfig, timeout: Duration) -> Result<Self> {
        Self::new(config.base_url.clone(), config.country_codes.clone(), timeout)
    }

    async fn search(&self, address: &str) -> Result<Option<GeocodeResult>> {
        let mut request = self.client.get(format!("{}/search", self.base_url)).query(&[
            ("q", address),
            ("format", "json"),
            ("limit", "1"),
        ]);
        if !self.country_codes.is_empty() {
            request = request.query(&[("countrycodes", self.country_codes.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::GeocodingApi(format!("HTTP {}", response.status())));
        }

        let places: Vec<SearchPlace> = response
            .json()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Failed to parse response: {}", e)))?;

        match places.into_iter().next() {
            Some(place) => place.into_result().map(Some),
            None => Ok(None),
        }
    }

    async fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lng.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::GeocodingApi(format!("HTTP {}", response.status())));
        }

        let place: ReversePlace = response
            .json()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = place.error {
            tracing::debug!("Reverse geocoding found nothing: {}", error);
        }
        Ok(place.display_name.filter(|name| !name.is_empty()))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode_address(&self, address: &str) -> Option<GeocodeResult> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        match self.search(address).await {
            Ok(Some(result)) => Some(result),
            Ok(None) => {
                tracing::debug!("No geocoding match for '{}'", address);
                None
            }
            Err(e) => {
                tracing::warn!("Geocoding '{}' failed: {}", address, e);
                None
            }
        }
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Option<String> {
        match self.reverse(coordinates).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(
                    lat = coordinates.lat,
                    lng = coordinates.lng,
                    "Reverse geocoding failed: {}",
                    e
                );
                None
            }
        }
    }
}

// Nominatim response types (lat/lon are strings)

#[derive(Debug, Deserialize)]
struct SearchPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl SearchPlace {
    fn into_result(self) -> Result<GeocodeResult> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| AppError::GeocodingApi(format!("Invalid lat '{}'", self.lat)))?;
        let lng: f64 = self
            .lon
            .parse()
            .map_err(|_| AppError::GeocodingApi(format!("Invalid lon '{}'", self.lon)))?;
        let coordinates = Coordinates::new(lat, lng).map_err(AppError::GeocodingApi)?;

        Ok(GeocodeResult {
            coordinates,
            display_name: self.display_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReversePlace {
    display_name: Option<String>,
    error: Option<String>,
}
