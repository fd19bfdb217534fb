// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod location;
pub mod map;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use services::geocoding::Geocoder;
use services::routing::RoutingClient;
use std::sync::Arc;

// App state for sharing across the HTTP facade
pub struct AppState {
    pub geocoder: Arc<dyn Geocoder>,
    pub routing: RoutingClient,
}
