//! Map surfaces and the registry that owns them.
//!
//! The crate never renders anything itself. A [`MapEngine`] creates
//! [`MapSurface`]s bound to a display container, and everything in this
//! module talks to the engine through those two traits.

pub mod headless;
pub mod registry;
pub mod styles;

pub use headless::{HeadlessEngine, HeadlessSurface};
pub use registry::{MapRegistry, SessionEntry, SessionServices};
pub use styles::{available_styles, resolve_style};

use crate::constants::{ROUTE_LINE_COLOR, ROUTE_LINE_OPACITY, ROUTE_LINE_WIDTH};
use crate::error::Result;
use crate::models::{BoundingBox, Coordinates};
use geo::LineString;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub type MarkerId = Uuid;

/// Called with the image id the engine could not find.
pub type MissingImageHandler = Arc<dyn Fn(String) + Send + Sync>;

/// Called when the user finishes dragging a draggable marker.
pub type DragEndHandler = Arc<dyn Fn(MarkerId, Coordinates) + Send + Sync>;

#[derive(Clone, Default)]
pub struct MarkerOptions {
    pub coordinates: Coordinates,
    pub color: Option<String>,
    /// Registered image id; the engine raises the missing-image signal if unknown
    pub icon: Option<String>,
    pub popup: Option<String>,
    pub draggable: bool,
    pub on_drag_end: Option<DragEndHandler>,
}

impl MarkerOptions {
    pub fn at(coordinates: Coordinates) -> Self {
        MarkerOptions {
            coordinates,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_popup(mut self, text: impl Into<String>) -> Self {
        self.popup = Some(text.into());
        self
    }

    pub fn draggable(mut self, on_drag_end: DragEndHandler) -> Self {
        self.draggable = true;
        self.on_drag_end = Some(on_drag_end);
        self
    }
}

impl fmt::Debug for MarkerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerOptions")
            .field("coordinates", &self.coordinates)
            .field("color", &self.color)
            .field("icon", &self.icon)
            .field("popup", &self.popup)
            .field("draggable", &self.draggable)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Round,
    Bevel,
    Miter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Butt,
    Square,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub join: LineJoin,
    pub cap: LineCap,
}

impl LineStyle {
    /// Fixed styling of route overlays.
    pub fn route() -> Self {
        LineStyle {
            color: ROUTE_LINE_COLOR.to_string(),
            width: ROUTE_LINE_WIDTH,
            opacity: ROUTE_LINE_OPACITY,
            join: LineJoin::Round,
            cap: LineCap::Round,
        }
    }
}

/// One rendered map bound to a display container.
///
/// Methods take `&self`; implementations synchronize internally because the
/// location tracker and icon resolver act on a surface from spawned tasks.
pub trait MapSurface: Send + Sync {
    fn container_id(&self) -> &str;

    fn set_view(&self, center: Coordinates, zoom: f64);
    fn set_center(&self, center: Coordinates);
    fn set_style(&self, style_url: &str);

    fn add_marker(&self, options: MarkerOptions) -> MarkerId;
    /// Returns `false` if the marker does not exist.
    fn set_marker_position(&self, id: MarkerId, coordinates: Coordinates) -> bool;
    fn set_marker_popup(&self, id: MarkerId, text: &str) -> bool;
    fn remove_marker(&self, id: MarkerId) -> bool;

    fn has_line_layer(&self, layer_id: &str) -> bool;
    fn add_line_layer(&self, layer_id: &str, geometry: &LineString<f64>, style: &LineStyle);
    /// Replace the geometry of an existing layer in place.
    fn set_line_geometry(&self, layer_id: &str, geometry: &LineString<f64>) -> bool;

    fn fit_bounds(&self, bounds: BoundingBox, padding_px: u32);

    /// Install the handler for the engine's "image needed" signal.
    fn on_missing_image(&self, handler: MissingImageHandler);
    fn add_image(&self, image_id: &str, data: &[u8]);
    fn has_image(&self, image_id: &str) -> bool;

    /// Release native resources. Further calls become no-ops.
    fn destroy(&self);
    fn is_destroyed(&self) -> bool;
}

/// Factory for surfaces bound to a container.
pub trait MapEngine: Send + Sync {
    fn create_surface(&self, container_id: &str) -> Result<Arc<dyn MapSurface>>;
}

/// `[lng, lat]` line geometry for a coordinate path.
pub fn line_geometry(coordinates: &[Coordinates]) -> LineString<f64> {
    coordinates
        .iter()
        .map(|c| (c.lng, c.lat))
        .collect::<Vec<_>>()
        .into()
}
