//! In-memory rendering engine.
//!
//! Records everything a real engine would draw so the registry can run
//! server-side and be inspected in tests. Event delivery (missing images,
//! marker drags) is triggered explicitly through [`HeadlessSurface`] methods.

use crate::error::{AppError, Result};
use crate::map::{
    DragEndHandler, LineStyle, MapEngine, MapSurface, MarkerId, MarkerOptions,
    MissingImageHandler,
};
use crate::models::{BoundingBox, Coordinates};
use geo::LineString;
use geojson::{Feature, Geometry, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct HeadlessEngine {
    created: Mutex<Vec<Arc<HeadlessSurface>>>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every surface created for `container_id`, oldest first.
    pub fn surfaces_for(&self, container_id: &str) -> Vec<Arc<HeadlessSurface>> {
        lock(&self.created)
            .iter()
            .filter(|s| s.container_id == container_id)
            .cloned()
            .collect()
    }

    /// Most recently created surface for `container_id`.
    pub fn latest(&self, container_id: &str) -> Option<Arc<HeadlessSurface>> {
        self.surfaces_for(container_id).pop()
    }

    pub fn created_count(&self) -> usize {
        lock(&self.created).len()
    }
}

impl MapEngine for HeadlessEngine {
    fn create_surface(&self, container_id: &str) -> Result<Arc<dyn MapSurface>> {
        if container_id.trim().is_empty() {
            return Err(AppError::MapEngine(
                "Container id must not be empty".to_string(),
            ));
        }

        let surface = Arc::new(HeadlessSurface::new(container_id));
        lock(&self.created).push(Arc::clone(&surface));
        Ok(surface)
    }
}

#[derive(Clone)]
pub struct MarkerState {
    pub coordinates: Coordinates,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub popup: Option<String>,
    pub draggable: bool,
    on_drag_end: Option<DragEndHandler>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    pub geometry: LineString<f64>,
    pub style: LineStyle,
    /// Times the geometry was replaced after creation
    pub updates: usize,
}

#[derive(Default)]
struct SurfaceState {
    center: Coordinates,
    zoom: f64,
    style_url: Option<String>,
    markers: HashMap<MarkerId, MarkerState>,
    line_layers: HashMap<String, LineLayer>,
    images: HashMap<String, Vec<u8>>,
    fitted: Option<(BoundingBox, u32)>,
    missing_image_handler: Option<MissingImageHandler>,
    destroyed: bool,
}

pub struct HeadlessSurface {
    container_id: String,
    state: Mutex<SurfaceState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl HeadlessSurface {
    pub fn new(container_id: &str) -> Self {
        HeadlessSurface {
            container_id: container_id.to_string(),
            state: Mutex::new(SurfaceState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        lock(&self.state)
    }

    pub fn center(&self) -> Coordinates {
        self.state().center
    }

    pub fn zoom(&self) -> f64 {
        self.state().zoom
    }

    pub fn style_url(&self) -> Option<String> {
        self.state().style_url.clone()
    }

    pub fn marker_count(&self) -> usize {
        self.state().markers.len()
    }

    pub fn marker(&self, id: MarkerId) -> Option<MarkerState> {
        self.state().markers.get(&id).cloned()
    }

    pub fn marker_ids(&self) -> Vec<MarkerId> {
        self.state().markers.keys().copied().collect()
    }

    pub fn line_layer_count(&self) -> usize {
        self.state().line_layers.len()
    }

    pub fn line_layer(&self, layer_id: &str) -> Option<LineLayer> {
        self.state().line_layers.get(layer_id).cloned()
    }

    /// Layer geometry as a GeoJSON feature with the layer id as feature id.
    pub fn line_layer_feature(&self, layer_id: &str) -> Option<Feature> {
        let layer = self.line_layer(layer_id)?;
        Some(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&layer.geometry))),
            id: Some(geojson::feature::Id::String(layer_id.to_string())),
            properties: None,
            foreign_members: None,
        })
    }

    pub fn fitted_bounds(&self) -> Option<(BoundingBox, u32)> {
        self.state().fitted
    }

    pub fn image(&self, image_id: &str) -> Option<Vec<u8>> {
        self.state().images.get(image_id).cloned()
    }

    /// Simulate the engine needing an image it does not have.
    /// Returns whether the signal was raised.
    pub fn request_image(&self, image_id: &str) -> bool {
        let handler = {
            let state = self.state();
            if state.destroyed || state.images.contains_key(image_id) {
                return false;
            }
            state.missing_image_handler.clone()
        };

        match handler {
            Some(handler) => {
                handler(image_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Simulate the user dragging a marker and releasing it at `to`.
    pub fn drag_marker(&self, id: MarkerId, to: Coordinates) -> bool {
        let handler = {
            let mut state = self.state();
            match state.markers.get_mut(&id) {
                Some(marker) if marker.draggable => {
                    marker.coordinates = to;
                    marker.on_drag_end.clone()
                }
                _ => return false,
            }
        };

        if let Some(handler) = handler {
            handler(id, to);
        }
        true
    }
}

impl MapSurface for HeadlessSurface {
    fn container_id(&self) -> &str {
        &self.container_id
    }

    fn set_view(&self, center: Coordinates, zoom: f64) {
        let mut state = self.state();
        state.center = center;
        state.zoom = zoom;
    }

    fn set_center(&self, center: Coordinates) {
        self.state().center = center;
    }

    fn set_style(&self, style_url: &str) {
        self.state().style_url = Some(style_url.to_string());
    }

    fn add_marker(&self, options: MarkerOptions) -> MarkerId {
        let id = Uuid::new_v4();
        let icon = options.icon.clone();
        self.state().markers.insert(
            id,
            MarkerState {
                coordinates: options.coordinates,
                color: options.color,
                icon: options.icon,
                popup: options.popup,
                draggable: options.draggable,
                on_drag_end: options.on_drag_end,
            },
        );

        // A real engine asks for the icon on first render
        if let Some(icon) = icon {
            self.request_image(&icon);
        }
        id
    }

    fn set_marker_position(&self, id: MarkerId, coordinates: Coordinates) -> bool {
        match self.state().markers.get_mut(&id) {
            Some(marker) => {
                marker.coordinates = coordinates;
                true
            }
            None => false,
        }
    }

    fn set_marker_popup(&self, id: MarkerId, text: &str) -> bool {
        match self.state().markers.get_mut(&id) {
            Some(marker) => {
                marker.popup = Some(text.to_string());
                true
            }
            None => false,
        }
    }

    fn remove_marker(&self, id: MarkerId) -> bool {
        self.state().markers.remove(&id).is_some()
    }

    fn has_line_layer(&self, layer_id: &str) -> bool {
        self.state().line_layers.contains_key(layer_id)
    }

    fn add_line_layer(&self, layer_id: &str, geometry: &LineString<f64>, style: &LineStyle) {
        self.state().line_layers.insert(
            layer_id.to_string(),
            LineLayer {
                geometry: geometry.clone(),
                style: style.clone(),
                updates: 0,
            },
        );
    }

    fn set_line_geometry(&self, layer_id: &str, geometry: &LineString<f64>) -> bool {
        match self.state().line_layers.get_mut(layer_id) {
            Some(layer) => {
                layer.geometry = geometry.clone();
                layer.updates += 1;
                true
            }
            None => false,
        }
    }

    fn fit_bounds(&self, bounds: BoundingBox, padding_px: u32) {
        self.state().fitted = Some((bounds, padding_px));
    }

    fn on_missing_image(&self, handler: MissingImageHandler) {
        self.state().missing_image_handler = Some(handler);
    }

    fn add_image(&self, image_id: &str, data: &[u8]) {
        let mut state = self.state();
        if !state.destroyed {
            state.images.insert(image_id.to_string(), data.to_vec());
        }
    }

    fn has_image(&self, image_id: &str) -> bool {
        self.state().images.contains_key(image_id)
    }

    fn destroy(&self) {
        let mut state = self.state();
        if state.destroyed {
            return;
        }
        state.destroyed = true;
        state.markers.clear();
        state.line_layers.clear();
        state.images.clear();
        state.missing_image_handler = None;
        tracing::debug!(container = %self.container_id, "Headless surface destroyed");
    }

    fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }
}
