use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use fieldmap::models::Coordinates;
use fieldmap::services::geocoding::{Geocoder, NominatimClient};
use serde_json::{json, Value};
use std::collections::HashMap;

mod common;

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    let scoped = params.get("countrycodes").map(String::as_str) == Some("fr")
        && params.get("limit").map(String::as_str) == Some("1");

    if !scoped || q.contains("nowhere") {
        return Json(json!([]));
    }

    Json(json!([
        {"lat": "48.8582599", "lon": "2.2945006", "display_name": "Tour Eiffel, Paris, France"},
        {"lat": "45.0", "lon": "5.0", "display_name": "Somewhere else"}
    ]))
}

async fn reverse(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let lat: f64 = params.get("lat").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    if lat.abs() < 1.0 {
        return Json(json!({"error": "Unable to geocode"}));
    }
    Json(json!({"display_name": "Musée du Louvre, Paris, France"}))
}

async fn nominatim_mock() -> NominatimClient {
    let base = common::spawn_mock(
        Router::new()
            .route("/search", get(search))
            .route("/reverse", get(reverse)),
    )
    .await;
    NominatimClient::new(base, "fr".to_string(), common::short_timeout()).unwrap()
}

#[tokio::test]
async fn test_geocode_takes_first_match() {
    let client = nominatim_mock().await;

    let result = client.geocode_address("Tour Eiffel").await.unwrap();

    assert_eq!(result.display_name, "Tour Eiffel, Paris, France");
    assert_eq!(result.coordinates.lat, 48.8582599);
    assert_eq!(result.coordinates.lng, 2.2945006);
}

#[tokio::test]
async fn test_geocode_zero_results_is_none() {
    let client = nominatim_mock().await;
    assert!(client.geocode_address("nowhere at all").await.is_none());
}

#[tokio::test]
async fn test_geocode_network_failure_is_none() {
    let client = NominatimClient::new(
        common::dead_base_url().await,
        "fr".to_string(),
        common::short_timeout(),
    )
    .unwrap();

    assert!(client.geocode_address("Tour Eiffel").await.is_none());
    assert!(client.reverse_geocode(common::louvre()).await.is_none());
}

#[tokio::test]
async fn test_geocode_http_error_and_bad_body_are_none() {
    let base = common::spawn_mock(
        Router::new()
            .route("/search", get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }))
            .route("/reverse", get(|| async { "<html>not json</html>" })),
    )
    .await;
    let client = NominatimClient::new(base, "fr".to_string(), common::short_timeout()).unwrap();

    assert!(client.geocode_address("Tour Eiffel").await.is_none());
    assert!(client.reverse_geocode(common::louvre()).await.is_none());
}

#[tokio::test]
async fn test_reverse_geocode() {
    let client = nominatim_mock().await;

    let name = client.reverse_geocode(common::louvre()).await;
    assert_eq!(name.as_deref(), Some("Musée du Louvre, Paris, France"));

    let ocean = Coordinates::new(0.0, 0.0).unwrap();
    assert!(client.reverse_geocode(ocean).await.is_none());
}

#[tokio::test]
async fn test_unscoped_client_omits_country_codes() {
    let client = {
        let base = common::spawn_mock(Router::new().route("/search", get(search))).await;
        NominatimClient::new(base, String::new(), common::short_timeout()).unwrap()
    };

    // The mock only answers country-scoped queries
    assert!(client.geocode_address("Tour Eiffel").await.is_none());
}
