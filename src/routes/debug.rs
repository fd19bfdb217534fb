use crate::map::available_styles;
use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// GET /debug/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "checks": {
            "fallback_speed_kmh": state.routing.fallback_speed_kmh(),
            "styles": available_styles().len(),
        }
    }))
}

/// GET /styles - style name to style URL
pub async fn list_styles() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(available_styles())
}
