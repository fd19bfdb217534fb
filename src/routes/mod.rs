pub mod debug;
pub mod directions;
pub mod geocode;

use axum::{routing::{get, post}, Router};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/geocode", get(geocode::geocode_address))
        .route("/reverse", get(geocode::reverse_geocode))
        .route("/routes", post(directions::calculate_route))
        .route("/styles", get(debug::list_styles))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
