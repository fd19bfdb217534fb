use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl TravelProfile {
    /// Profile segment of the directions URL.
    pub fn service_profile(&self) -> &'static str {
        match self {
            TravelProfile::Driving => "driving",
            TravelProfile::Walking => "walking",
            TravelProfile::Cycling => "cycling",
        }
    }
}

impl fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_profile())
    }
}

impl FromStr for TravelProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(TravelProfile::Driving),
            "walking" | "walk" | "foot" => Ok(TravelProfile::Walking),
            "cycling" | "bike" | "bicycle" => Ok(TravelProfile::Cycling),
            _ => Err(format!("Invalid travel profile: '{}'", s)),
        }
    }
}

/// Where a [`RouteResult`] came from. Consumers treat both the same way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteResult {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Path from start to end, at least two points
    pub coordinates: Vec<Coordinates>,
    pub source: RouteSource,
}

impl RouteResult {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds / 60.0).round() as u32
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RouteSource::Fallback
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: Coordinates,
    pub end: Coordinates,
    #[serde(default)]
    pub profile: TravelProfile,
}

impl RouteRequest {
    pub fn validate(&self) -> Result<(), String> {
        Coordinates::new(self.start.lat, self.start.lng).map_err(|e| format!("start: {}", e))?;
        Coordinates::new(self.end.lat, self.end.lng).map_err(|e| format!("end: {}", e))?;
        Ok(())
    }
}
