use crate::config::RoutingConfig;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, RouteResult, RouteSource, TravelProfile};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// How the client authenticates with the directions API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Public OSRM-style endpoint, no credentials.
    Anonymous,
    /// Send `access_token` query param (direct Mapbox).
    DirectToken(String),
    /// Proxy mode: send `Authorization: Bearer` header.
    BearerHeader(String),
}

/// Source of remote routes. [`RoutingClient`](super::routing::RoutingClient)
/// falls back to a straight line whenever this returns an error.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn get_route(
        &self,
        start: Coordinates,
        end: Coordinates,
        profile: TravelProfile,
    ) -> Result<RouteResult>;
}

#[derive(Clone)]
pub struct DirectionsClient {
    client: Client,
    base_url: String,
    auth_mode: AuthMode,
}

impl DirectionsClient {
    pub fn new(base_url: String, auth_mode: AuthMode, timeout: Duration) -> Result<Self> {
        let client = super::http_client(timeout)?;
        Ok(DirectionsClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_mode,
        })
    }

    pub fn from_config(config: &RoutingConfig, timeout: Duration) -> Result<Self> {
        let auth_mode = match (&config.access_token, config.bearer_auth) {
            (None, _) => AuthMode::Anonymous,
            (Some(token), false) => AuthMode::DirectToken(token.clone()),
            (Some(token), true) => AuthMode::BearerHeader(token.clone()),
        };
        Self::new(config.base_url.clone(), auth_mode, timeout)
    }

    fn route_url(&self, start: Coordinates, end: Coordinates, profile: TravelProfile) -> String {
        format!(
            "{}/{}/{},{};{},{}",
            self.base_url,
            profile.service_profile(),
            start.lng,
            start.lat,
            end.lng,
            end.lat
        )
    }
}

#[async_trait]
impl DirectionsProvider for DirectionsClient {
    /// Get a route between two points
    /// Returns the first route with full geometry, distance, and duration
    async fn get_route(
        &self,
        start: Coordinates,
        end: Coordinates,
        profile: TravelProfile,
    ) -> Result<RouteResult> {
        let url = self.route_url(start, end, profile);

        tracing::debug!(
            profile = %profile,
            "Directions request: {:.5},{:.5} -> {:.5},{:.5}",
            start.lat, start.lng, end.lat, end.lng
        );

        let mut request = self.client.get(&url).query(&[
            ("geometries", "geojson"),
            ("overview", "full"),
            ("steps", "false"),
        ]);

        match &self.auth_mode {
            AuthMode::Anonymous => {}
            AuthMode::DirectToken(token) => {
                request = request.query(&[("access_token", token)]);
            }
            AuthMode::BearerHeader(token) => {
                request = request.bearer_auth(token);
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
            tracing::warn!(
                status = %status,
                "Directions API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::RoutingApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let directions: DirectionsApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Failed to parse response: {}", e)))?;

        let route = directions
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RoutingApi("No routes found".to_string()))?;

        route.into_result()
    }
}

// Directions API response types (OSRM and Mapbox share this shape)

#[derive(Debug, Deserialize)]
struct DirectionsApiResponse {
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    distance: f64, // meters
    duration: f64, // seconds
    geometry: ApiGeometry,
}

#[derive(Debug, Deserialize)]
struct ApiGeometry {
    coordinates: Vec<[f64; 2]>, // [lng, lat] pairs
}

impl ApiRoute {
    fn into_result(self) -> Result<RouteResult> {
        if !(self.distance.is_finite() && self.distance >= 0.0)
            || !(self.duration.is_finite() && self.duration >= 0.0)
        {
            return Err(AppError::RoutingApi(format!(
                "Invalid distance/duration: {} m, {} s",
                self.distance, self.duration
            )));
        }

        let coordinates = self
            .geometry
            .coordinates
            .iter()
            .map(|[lng, lat]| Coordinates::from_lng_lat(*lng, *lat))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::RoutingApi(format!("Invalid geometry: {}", e)))?;

        if coordinates.len() < 2 {
            return Err(AppError::RoutingApi(format!(
                "Route geometry has {} point(s), need at least 2",
                coordinates.len()
            )));
        }

        tracing::debug!(
            "Directions response: {:.2}km, {:.0}min, {} path points",
            self.distance / 1000.0,
            self.duration / 60.0,
            coordinates.len()
        );

        Ok(RouteResult {
            distance_meters: self.distance,
            duration_seconds: self.duration,
            coordinates,
            source: RouteSource::Remote,
        })
    }
}
