use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{GeoPoint, OrderId};
use crate::time::duration_serde;

/// A delivery or pickup request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    /// Day the order should be served; `None` for orders not yet planned
    #[serde(default)]
    pub planned_date: Option<NaiveDate>,
    /// Geocoded position; `None` until geocoding succeeds
    #[serde(default)]
    pub point: Option<GeoPoint>,
    #[serde(with = "duration_serde", default = "default_service_time")]
    pub service_time: Duration,
}

fn default_service_time() -> Duration {
    Duration::minutes(10)
}

impl Order {
    #[must_use]
    pub fn new(name: impl Into<String>, planned_date: Option<NaiveDate>) -> Self {
        Self {
            id: OrderId::new(),
            name: name.into(),
            planned_date,
            point: None,
            service_time: default_service_time(),
        }
    }

    #[must_use]
    pub fn with_point(mut self, point: GeoPoint) -> Self {
        self.point = Some(point);
        self
    }

    #[must_use]
    pub const fn is_geocoded(&self) -> bool {
        self.point.is_some()
    }

    /// True if the order may be served on `date`
    ///
    /// Unplanned orders fit any day.
    #[must_use]
    pub fn fits_date(&self, date: NaiveDate) -> bool {
        self.planned_date.map_or(true, |planned| planned == date)
    }
}
