use crate::error::{AppError, Result};
use crate::models::{Coordinates, GeocodeResult};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// GET /geocode?q=...
/// Resolve an address to its first match
pub async fn geocode_address(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResult>> {
    if query.q.trim().is_empty() {
        return Err(AppError::InvalidRequest("Query must not be empty".to_string()));
    }

    tracing::info!("Geocode request: '{}'", query.q);

    state
        .geocoder
        .geocode_address(&query.q)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No match for '{}'", query.q)))
}

/// GET /reverse?lat=...&lng=...
pub async fn reverse_geocode(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<ReverseResponse>> {
    let coordinates = Coordinates::new(query.lat, query.lng).map_err(AppError::InvalidRequest)?;

    let display_name = state
        .geocoder
        .reverse_geocode(coordinates)
        .await
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No address at {:.5},{:.5}",
                coordinates.lat, coordinates.lng
            ))
        })?;

    Ok(Json(ReverseResponse {
        coordinates,
        display_name,
    }))
}
