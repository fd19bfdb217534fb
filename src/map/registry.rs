use crate::config::Config;
use crate::constants::{DEFAULT_MAP_STYLE, ROUTE_FIT_PADDING_PX};
use crate::error::{AppError, Result};
use crate::location::{LocationProvider, LocationTracker, PositionCallback, PositionErrorHandler};
use crate::map::styles::{self, resolve_style};
use crate::map::{line_geometry, LineStyle, MapEngine, MapSurface, MarkerId, MarkerOptions};
use crate::models::{BoundingBox, Coordinates, GeocodeResult, RouteResult, TravelProfile, WatchOptions};
use crate::services::geocoding::{Geocoder, NominatimClient};
use crate::services::icons::IconResolver;
use crate::services::routing::RoutingClient;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// The registry's record of one live map.
#[derive(Clone)]
pub struct SessionEntry {
    pub id: String,
    pub surface: Arc<dyn MapSurface>,
}

/// Collaborators shared by every session of a registry.
#[derive(Clone)]
pub struct SessionServices {
    pub geocoder: Arc<dyn Geocoder>,
    pub routing: RoutingClient,
    /// `None` disables icon fetching; surfaces then render their default marker
    pub icons: Option<Arc<IconResolver>>,
    pub location: Arc<dyn LocationProvider>,
}

impl SessionServices {
    pub fn from_config(config: &Config, location: Arc<dyn LocationProvider>) -> Result<Self> {
        let timeout = config.http_timeout();
        Ok(SessionServices {
            geocoder: Arc::new(NominatimClient::from_config(&config.geocoding, timeout)?),
            routing: RoutingClient::from_config(&config.routing, timeout)?,
            icons: Some(Arc::new(IconResolver::new(&config.icons, timeout)?)),
            location,
        })
    }
}

/// Creates, indexes and destroys map surfaces, and ties each one to the
/// shared location tracker, icon resolver, geocoder and router.
pub struct MapRegistry {
    engine: Arc<dyn MapEngine>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    tracker: Mutex<LocationTracker>,
    geocoder: Arc<dyn Geocoder>,
    routing: RoutingClient,
    icons: Option<Arc<IconResolver>>,
    default_style: String,
}

impl MapRegistry {
    pub fn new(engine: Arc<dyn MapEngine>, services: SessionServices) -> Self {
        MapRegistry {
            engine,
            sessions: RwLock::new(HashMap::new()),
            tracker: Mutex::new(LocationTracker::new(services.location)),
            geocoder: services.geocoder,
            routing: services.routing,
            icons: services.icons,
            default_style: DEFAULT_MAP_STYLE.to_string(),
        }
    }

    pub fn from_config(
        engine: Arc<dyn MapEngine>,
        config: &Config,
        location: Arc<dyn LocationProvider>,
    ) -> Result<Self> {
        let services = SessionServices::from_config(config, location)?;
        Ok(Self::new(engine, services).with_default_style(&config.default_style))
    }

    /// Style applied when `create_map` is given an empty style.
    pub fn with_default_style(mut self, style: &str) -> Self {
        self.default_style = style.to_string();
        self
    }

    fn tracker(&self) -> MutexGuard<'_, LocationTracker> {
        self.tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a map bound to `container_id`.
    ///
    /// `style` may be a catalog name or a style URL; empty selects the
    /// registry's default style. If a map already exists
    /// under the same id it is destroyed first, so the registry never leaks
    /// a surface it no longer indexes.
    pub fn create_map(
        &self,
        container_id: &str,
        center: Coordinates,
        zoom: f64,
        style: &str,
    ) -> Result<Arc<dyn MapSurface>> {
        if self.get_map(container_id).is_some() {
            tracing::warn!(
                container = %container_id,
                "Map already exists for container, destroying the previous surface"
            );
            self.destroy_map(container_id);
        }

        let surface = self.engine.create_surface(container_id)?;
        let style = if style.trim().is_empty() {
            self.default_style.as_str()
        } else {
            style
        };
        surface.set_view(center, zoom);
        surface.set_style(resolve_style(style));

        if let Some(icons) = &self.icons {
            let icons = Arc::clone(icons);
            let weak = Arc::downgrade(&surface);
            surface.on_missing_image(Arc::new(move |image_id| {
                icons.handle_missing_image(weak.clone(), image_id);
            }));
        }

        let entry = SessionEntry {
            id: container_id.to_string(),
            surface: Arc::clone(&surface),
        };
        let previous = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(container_id.to_string(), entry);

        // Lost a race with a concurrent create for the same id
        if let Some(previous) = previous {
            previous.surface.destroy();
        }

        tracing::info!(
            container = %container_id,
            zoom,
            "Map created at {:.5},{:.5}",
            center.lat,
            center.lng
        );
        Ok(surface)
    }

    /// Destroy the map under `container_id`, stopping any active location
    /// tracking first. Returns `false` for unknown ids.
    pub fn destroy_map(&self, container_id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(container_id);

        let Some(entry) = removed else {
            tracing::debug!(container = %container_id, "destroy_map: unknown container");
            return false;
        };

        self.tracker().stop();
        entry.surface.destroy();
        tracing::info!(container = %container_id, "Map destroyed");
        true
    }

    pub fn get_map(&self, container_id: &str) -> Option<Arc<dyn MapSurface>> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(container_id)
            .map(|entry| Arc::clone(&entry.surface))
    }

    fn require_map(&self, container_id: &str) -> Result<Arc<dyn MapSurface>> {
        self.get_map(container_id)
            .ok_or_else(|| AppError::NotFound(format!("No map for container '{}'", container_id)))
    }

    pub fn map_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Draw `coordinates` as the overlay `route_id`, updating the geometry
    /// in place when the overlay already exists, then fit the view to it.
    pub fn display_route(
        &self,
        surface: &dyn MapSurface,
        coordinates: &[Coordinates],
        route_id: &str,
    ) -> Result<()> {
        if coordinates.len() < 2 {
            return Err(AppError::InvalidRequest(format!(
                "Route '{}' needs at least 2 coordinates, got {}",
                route_id,
                coordinates.len()
            )));
        }

        let geometry = line_geometry(coordinates);
        if surface.has_line_layer(route_id) {
            surface.set_line_geometry(route_id, &geometry);
        } else {
            surface.add_line_layer(route_id, &geometry, &LineStyle::route());
        }

        if let Some(bounds) = BoundingBox::from_path(coordinates) {
            surface.fit_bounds(bounds, ROUTE_FIT_PADDING_PX);
        }

        tracing::debug!(
            container = %surface.container_id(),
            route = %route_id,
            points = coordinates.len(),
            "Route displayed"
        );
        Ok(())
    }

    /// Calculate a route and draw it on the map under `container_id`.
    pub async fn route_between(
        &self,
        container_id: &str,
        start: Coordinates,
        end: Coordinates,
        profile: TravelProfile,
        route_id: &str,
    ) -> Result<RouteResult> {
        let route = self.routing.calculate_route(start, end, profile).await;
        // Looked up after the await: the map may have been destroyed meanwhile
        let surface = self.require_map(container_id)?;
        self.display_route(surface.as_ref(), &route.coordinates, route_id)?;
        Ok(route)
    }

    pub fn available_styles(&self) -> BTreeMap<&'static str, &'static str> {
        styles::available_styles()
    }

    pub fn set_style(&self, container_id: &str, style: &str) -> Result<()> {
        self.require_map(container_id)?
            .set_style(resolve_style(style));
        Ok(())
    }

    pub fn add_marker(&self, container_id: &str, options: MarkerOptions) -> Result<MarkerId> {
        Ok(self.require_map(container_id)?.add_marker(options))
    }

    pub fn move_marker(
        &self,
        container_id: &str,
        marker: MarkerId,
        coordinates: Coordinates,
    ) -> Result<()> {
        if !self
            .require_map(container_id)?
            .set_marker_position(marker, coordinates)
        {
            return Err(AppError::NotFound(format!("Marker {} not found", marker)));
        }
        Ok(())
    }

    pub fn remove_marker(&self, container_id: &str, marker: MarkerId) -> Result<bool> {
        Ok(self.require_map(container_id)?.remove_marker(marker))
    }

    pub fn start_tracking(
        &self,
        container_id: &str,
        callback: PositionCallback,
        options: WatchOptions,
    ) -> Result<()> {
        let surface = self.require_map(container_id)?;
        self.tracker().start(surface, callback, options)
    }

    pub fn stop_tracking(&self) {
        self.tracker().stop();
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker().is_tracking()
    }

    pub fn tracking_marker(&self) -> Option<MarkerId> {
        self.tracker().marker_id()
    }

    pub fn set_tracking_error_handler(&self, handler: PositionErrorHandler) {
        self.tracker().set_error_handler(handler);
    }

    pub async fn geocode_address(&self, address: &str) -> Option<GeocodeResult> {
        self.geocoder.geocode_address(address).await
    }

    pub async fn reverse_geocode(&self, coordinates: Coordinates) -> Option<String> {
        self.geocoder.reverse_geocode(coordinates).await
    }

    pub fn routing(&self) -> &RoutingClient {
        &self.routing
    }
}

impl Drop for MapRegistry {
    fn drop(&mut self) {
        self.tracker().stop();
        let sessions = std::mem::take(
            self.sessions
                .get_mut()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for entry in sessions.into_values() {
            entry.surface.destroy();
        }
    }
}
