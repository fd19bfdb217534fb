use crate::error::{AppError, Result};
use crate::models::{RouteRequest, RouteResult};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /routes
/// Route between two points; degrades to a straight line when the
/// directions service is unavailable
pub async fn calculate_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResult>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    tracing::info!(
        profile = %request.profile,
        "Route request: ({:.4}, {:.4}) -> ({:.4}, {:.4})",
        request.start.lat, request.start.lng, request.end.lat, request.end.lng
    );

    let route = state
        .routing
        .calculate_route(request.start, request.end, request.profile)
        .await;

    Ok(Json(route))
}
