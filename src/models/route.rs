use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RouteId, Stop, StopId, ZoneId};
use crate::constants::DEFAULT_ROUTE_NAME_PREFIX;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RouteFlags: u8 {
        /// Stops can be neither added nor removed
        const LOCKED     = 0b0000_0001;
        /// Shown on the map
        const VISIBLE    = 0b0000_0010;
        /// Orders outside the route's zones are refused
        const HARD_ZONES = 0b0000_0100;
    }
}

impl Default for RouteFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn generate_route_color(seed: usize) -> String {
    // Use a simple hash-based color generator for deterministic but varied colors
    let hue = f64::from(((seed * 137) % 360) as i32);
    let saturation = 65.0 + f64::from(((seed * 97) % 20) as i32); // 65-85%
    let lightness = 55.0 + f64::from(((seed * 53) % 15) as i32);  // 55-70%

    // Convert HSL to RGB
    let chroma = (1.0 - (2.0 * lightness / 100.0 - 1.0).abs()) * saturation / 100.0;
    let second_component = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let lightness_match = lightness / 100.0 - chroma / 2.0;

    let (red, green, blue) = match hue as u32 {
        0..=59 => (chroma, second_component, 0.0),
        60..=119 => (second_component, chroma, 0.0),
        120..=179 => (0.0, chroma, second_component),
        180..=239 => (0.0, second_component, chroma),
        240..=299 => (second_component, 0.0, chroma),
        _ => (chroma, 0.0, second_component),
    };

    format!("#{:02X}{:02X}{:02X}",
        ((red + lightness_match) * 255.0) as u8,
        ((green + lightness_match) * 255.0) as u8,
        ((blue + lightness_match) * 255.0) as u8
    )
}

/// Lowest-numbered `"Route N"` name not present in `existing`
#[must_use]
pub fn next_default_route_name<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    next_default_name(DEFAULT_ROUTE_NAME_PREFIX, existing)
}

/// Lowest-numbered `"{prefix} N"` (N starting at 1) not present in `existing`
#[must_use]
pub fn next_default_name<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: std::collections::HashSet<u32> = existing
        .into_iter()
        .filter_map(|name| name.strip_prefix(prefix))
        .filter_map(|rest| rest.strip_prefix(' '))
        .filter_map(|number| number.parse().ok())
        .collect();

    let mut index = 1;
    while taken.contains(&index) {
        index += 1;
    }
    format!("{prefix} {index}")
}

/// An ordered sequence of stops driven on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub flags: RouteFlags,
    #[serde(default)]
    pub zones: Vec<ZoneId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl Route {
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RouteId::new(),
            name: name.into(),
            color: color.into(),
            flags: RouteFlags::default(),
            zones: Vec::new(),
            created_at,
            stops: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.flags.contains(RouteFlags::LOCKED)
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.flags.contains(RouteFlags::VISIBLE)
    }

    /// Zones that restrict this route, empty when zones are only advisory
    #[must_use]
    pub fn hard_zones(&self) -> &[ZoneId] {
        if self.flags.contains(RouteFlags::HARD_ZONES) {
            &self.zones
        } else {
            &[]
        }
    }

    #[must_use]
    pub fn stop_index(&self, stop: StopId) -> Option<usize> {
        self.stops.iter().position(|s| s.id == stop)
    }

    #[must_use]
    pub fn stop(&self, stop: StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == stop)
    }

    #[must_use]
    pub fn stop_ids(&self) -> Vec<StopId> {
        self.stops.iter().map(|s| s.id).collect()
    }

    /// Copy of the route with fresh route and stop ids
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: RouteId::new(),
            stops: self.stops.iter().map(Stop::duplicate).collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationId, OrderId};
    use chrono::Duration;

    #[test]
    fn test_generate_route_color_is_hex() {
        for seed in 0..20 {
            let color = generate_route_color(seed);
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
        }
        assert_eq!(generate_route_color(3), generate_route_color(3));
    }

    #[test]
    fn test_next_default_route_name_fills_gaps() {
        assert_eq!(next_default_route_name([]), "Route 1");
        assert_eq!(next_default_route_name(["Route 1", "Route 2"]), "Route 3");
        assert_eq!(next_default_route_name(["Route 1", "Route 3", "Truck 2"]), "Route 2");
        assert_eq!(next_default_route_name(["Route", "Route x"]), "Route 1");
    }

    #[test]
    fn test_default_flags() {
        let route = Route::new("R", "#000000", Utc::now());
        assert!(route.is_visible());
        assert!(!route.is_locked());
    }

    #[test]
    fn test_hard_zones_require_flag() {
        let mut route = Route::new("R", "#000000", Utc::now());
        route.zones.push(ZoneId::new());
        assert!(route.hard_zones().is_empty());

        route.flags.insert(RouteFlags::HARD_ZONES);
        assert_eq!(route.hard_zones().len(), 1);
    }

    #[test]
    fn test_duplicate_renews_ids() {
        let mut route = Route::new("R", "#000000", Utc::now());
        route.stops.push(Stop::for_order(OrderId::new(), Duration::minutes(5)));
        route.stops.push(Stop::for_location(LocationId::new()));

        let copy = route.duplicate();
        assert_ne!(copy.id, route.id);
        assert_eq!(copy.name, route.name);
        assert_eq!(copy.stops.len(), 2);
        assert!(copy.stops.iter().zip(&route.stops).all(|(a, b)| a.id != b.id && a.object == b.object));
    }

    #[test]
    fn test_flags_serialization() {
        let flags = RouteFlags::LOCKED | RouteFlags::HARD_ZONES;
        let serialized = serde_json::to_string(&flags).expect("serialization should succeed");
        let deserialized: RouteFlags = serde_json::from_str(&serialized).expect("deserialization should succeed");
        assert_eq!(flags, deserialized);
    }
}
