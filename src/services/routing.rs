use crate::config::RoutingConfig;
use crate::constants::DEFAULT_FALLBACK_SPEED_KMH;
use crate::error::Result;
use crate::models::{distance, Coordinates, RouteResult, RouteSource, TravelProfile};
use crate::services::directions::{DirectionsClient, DirectionsProvider};
use std::sync::Arc;
use std::time::Duration;

/// Route calculation that always produces a usable [`RouteResult`].
///
/// The remote directions service is tried first. Any failure (transport,
/// timeout, non-2xx, malformed body) degrades to a straight line between the
/// two points, with distance from the haversine formula and duration from a
/// flat average speed. Both paths report meters and seconds.
#[derive(Clone)]
pub struct RoutingClient {
    provider: Arc<dyn DirectionsProvider>,
    fallback_speed_kmh: f64,
}

impl RoutingClient {
    pub fn new(provider: Arc<dyn DirectionsProvider>) -> Self {
        RoutingClient {
            provider,
            fallback_speed_kmh: DEFAULT_FALLBACK_SPEED_KMH,
        }
    }

    pub fn from_config(config: &RoutingConfig, timeout: Duration) -> Result<Self> {
        let client = DirectionsClient::from_config(config, timeout)?;
        Ok(Self::new(Arc::new(client)).with_fallback_speed(config.fallback_speed_kmh))
    }

    pub fn with_fallback_speed(mut self, kmh: f64) -> Self {
        self.fallback_speed_kmh = kmh;
        self
    }

    pub fn fallback_speed_kmh(&self) -> f64 {
        self.fallback_speed_kmh
    }

    pub async fn calculate_route(
        &self,
        start: Coordinates,
        end: Coordinates,
        profile: TravelProfile,
    ) -> RouteResult {
        match self.provider.get_route(start, end, profile).await {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(
                    profile = %profile,
                    "Routing service unavailable ({}), using straight-line fallback",
                    e
                );
                self.fallback_route(start, end)
            }
        }
    }

    /// Straight two-point route at the configured average speed.
    pub fn fallback_route(&self, start: Coordinates, end: Coordinates) -> RouteResult {
        let d_km = distance(start, end);

        RouteResult {
            distance_meters: d_km * 1000.0,
            duration_seconds: (d_km / self.fallback_speed_kmh) * 3600.0,
            coordinates: vec![start, end],
            source: RouteSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;

    struct FailingProvider;

    #[async_trait]
    impl DirectionsProvider for FailingProvider {
        async fn get_route(
            &self,
            _start: Coordinates,
            _end: Coordinates,
            _profile: TravelProfile,
        ) -> Result<RouteResult> {
            Err(AppError::RoutingApi("Request failed: connection refused".to_string()))
        }
    }

    struct FixedProvider(RouteResult);

    #[async_trait]
    impl DirectionsProvider for FixedProvider {
        async fn get_route(
            &self,
            _start: Coordinates,
            _end: Coordinates,
            _profile: TravelProfile,
        ) -> Result<RouteResult> {
            Ok(self.0.clone())
        }
    }

    fn paris() -> Coordinates {
        Coordinates::new(48.8566, 2.3522).unwrap()
    }

    fn versailles() -> Coordinates {
        Coordinates::new(48.8049, 2.1204).unwrap()
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let client = RoutingClient::new(Arc::new(FailingProvider));
        let (start, end) = (paris(), versailles());
        let d_km = distance(start, end);

        let route = client
            .calculate_route(start, end, TravelProfile::Driving)
            .await;

        assert_eq!(route.coordinates, vec![start, end]);
        assert!((route.distance_meters - 1000.0 * d_km).abs() < 1e-9);
        assert!((route.duration_seconds - (d_km / 50.0) * 3600.0).abs() < 1e-9);
        assert!(route.is_fallback());
    }

    #[tokio::test]
    async fn test_remote_route_passes_through() {
        let remote = RouteResult {
            distance_meters: 21_400.0,
            duration_seconds: 1_800.0,
            coordinates: vec![paris(), Coordinates::new(48.83, 2.25).unwrap(), versailles()],
            source: RouteSource::Remote,
        };
        let client = RoutingClient::new(Arc::new(FixedProvider(remote.clone())));

        let route = client
            .calculate_route(paris(), versailles(), TravelProfile::Cycling)
            .await;

        assert_eq!(route, remote);
    }

    #[test]
    fn test_fallback_speed_override() {
        let client = RoutingClient::new(Arc::new(FailingProvider)).with_fallback_speed(25.0);
        let route = client.fallback_route(paris(), versailles());
        let d_km = distance(paris(), versailles());

        assert!((route.duration_seconds - (d_km / 25.0) * 3600.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_same_point() {
        let client = RoutingClient::new(Arc::new(FailingProvider));
        let route = client.fallback_route(paris(), paris());

        assert_eq!(route.distance_meters, 0.0);
        assert_eq!(route.duration_seconds, 0.0);
        assert_eq!(route.coordinates.len(), 2);
    }
}
