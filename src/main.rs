use axum::Router;
use fieldmap::config::Config;
use fieldmap::services::geocoding::NominatimClient;
use fieldmap::services::routing::RoutingClient;
use fieldmap::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldmap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting fieldmap API server");
    tracing::info!(
        routing = %config.routing.base_url,
        geocoder = %config.geocoding.base_url,
        country_codes = %config.geocoding.country_codes,
        fallback_speed_kmh = config.routing.fallback_speed_kmh,
        "Configuration loaded successfully"
    );

    // Initialize services
    let timeout = config.http_timeout();
    let geocoder = NominatimClient::from_config(&config.geocoding, timeout)?;
    let routing = RoutingClient::from_config(&config.routing, timeout)?;

    let state = Arc::new(AppState {
        geocoder: Arc::new(geocoder),
        routing,
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", fieldmap::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
