pub mod coordinates;
pub mod geo;
pub mod geocode;
pub mod position;
pub mod route;

pub use coordinates::{distance, Coordinates};
pub use geo::BoundingBox;
pub use geocode::GeocodeResult;
pub use position::{Position, PositionError, PositionErrorKind, WatchOptions};
pub use route::{RouteRequest, RouteResult, RouteSource, TravelProfile};
