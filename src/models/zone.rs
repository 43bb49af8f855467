use serde::{Deserialize, Serialize};

use super::{GeoPoint, ZoneId};
use crate::geometry::point_in_polygon;

/// A named polygon a route may be restricted to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub polygon: Vec<GeoPoint>,
}

impl Zone {
    #[must_use]
    pub fn new(name: impl Into<String>, polygon: Vec<GeoPoint>) -> Self {
        Self {
            id: ZoneId::new(),
            name: name.into(),
            polygon,
        }
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        let vertices: Vec<(f64, f64)> = self.polygon.iter().map(|p| p.as_tuple()).collect();
        point_in_polygon(point.as_tuple(), &vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_contains() {
        let zone = Zone::new(
            "North",
            vec![
                GeoPoint::new(0.0, 10.0),
                GeoPoint::new(10.0, 10.0),
                GeoPoint::new(10.0, 20.0),
                GeoPoint::new(0.0, 20.0),
            ],
        );
        assert!(zone.contains(GeoPoint::new(5.0, 15.0)));
        assert!(!zone.contains(GeoPoint::new(5.0, 5.0)));
    }
}
