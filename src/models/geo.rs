use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box enclosing every point of `path`, or `None` for an empty path.
    pub fn from_path(path: &[Coordinates]) -> Option<Self> {
        let first = path.first()?;
        let mut bbox = BoundingBox {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };

        for coord in &path[1..] {
            bbox.min_lat = bbox.min_lat.min(coord.lat);
            bbox.max_lat = bbox.max_lat.max(coord.lat);
            bbox.min_lng = bbox.min_lng.min(coord.lng);
            bbox.max_lng = bbox.max_lng.max(coord.lng);
        }

        Some(bbox)
    }

    pub fn south_west(&self) -> Coordinates {
        Coordinates {
            lat: self.min_lat,
            lng: self.min_lng,
        }
    }

    pub fn north_east(&self) -> Coordinates {
        Coordinates {
            lat: self.max_lat,
            lng: self.max_lng,
        }
    }

    pub fn contains(&self, c: &Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.lat)
            && (self.min_lng..=self.max_lng).contains(&c.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let path = vec![
            Coordinates { lat: 48.85, lng: 2.35 },
            Coordinates { lat: 48.86, lng: 2.29 },
            Coordinates { lat: 48.84, lng: 2.33 },
        ];
        let bbox = BoundingBox::from_path(&path).unwrap();

        assert_eq!(bbox.min_lat, 48.84);
        assert_eq!(bbox.max_lat, 48.86);
        assert_eq!(bbox.min_lng, 2.29);
        assert_eq!(bbox.max_lng, 2.35);
        assert!(path.iter().all(|c| bbox.contains(c)));
    }

    #[test]
    fn test_from_empty_path() {
        assert!(BoundingBox::from_path(&[]).is_none());
    }
}
