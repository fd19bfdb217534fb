use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// Build from a `[lng, lat]` pair, the order used by GeoJSON and the
    /// routing/geocoding services.
    pub fn from_lng_lat(lng: f64, lat: f64) -> Result<Self, String> {
        Self::new(lat, lng)
    }

    /// `[lng, lat]` pair for GeoJSON and service URLs.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Calculate distance between two coordinates using Haversine formula
    /// Returns distance in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance(*self, *other)
    }
}

/// Great-circle distance in kilometers (haversine, R = 6371 km).
///
/// Inputs are not validated: non-finite components propagate as `NaN`.
/// Callers wanting range checks should build their points through
/// [`Coordinates::new`].
pub fn distance(a: Coordinates, b: Coordinates) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
