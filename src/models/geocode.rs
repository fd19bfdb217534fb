use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// A resolved address. Not finding one is reported as `None`, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodeResult {
    pub coordinates: Coordinates,
    pub display_name: String,
}
