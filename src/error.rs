use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::PositionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Routing API error: {0}")]
    RoutingApi(String),

    #[error("Geocoding API error: {0}")]
    GeocodingApi(String),

    #[error("Icon fetch failed: {0}")]
    IconFetch(String),

    #[error("Map engine error: {0}")]
    MapEngine(String),

    #[error("Device location is not supported")]
    LocationUnsupported,

    #[error("Location error: {0}")]
    Position(#[from] PositionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::RoutingApi(ref e) => {
                tracing::error!("Routing API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error".to_string())
            }
            AppError::GeocodingApi(ref e) => {
                tracing::error!("Geocoding API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Geocoding service error".to_string())
            }
            AppError::IconFetch(ref e) => {
                tracing::warn!("Icon fetch failed: {}", e);
                (StatusCode::BAD_GATEWAY, "Icon fetch failed".to_string())
            }
            AppError::MapEngine(ref e) => {
                tracing::error!("Map engine error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Map engine error".to_string())
            }
            AppError::LocationUnsupported => (
                StatusCode::NOT_IMPLEMENTED,
                "Device location is not supported".to_string(),
            ),
            AppError::Position(ref e) => (StatusCode::SERVICE_UNAVAILABLE, e.user_message().to_string()),
            AppError::Config(ref e) => {
                tracing::error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string())
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::NotFound(ref e) => (StatusCode::NOT_FOUND, e.clone()),
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
