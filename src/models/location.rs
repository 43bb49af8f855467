use serde::{Deserialize, Serialize};

use super::LocationId;

/// A geographic position, longitude as `x` and latitude as `y`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn as_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// A depot or other fixed place a route can visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub point: Option<GeoPoint>,
}

impl Location {
    #[must_use]
    pub fn new(name: impl Into<String>, point: Option<GeoPoint>) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            point,
        }
    }
}
