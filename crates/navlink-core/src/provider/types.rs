//! Canonical navigation types handed to callers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84-style coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `"lon,lat"`, the order map providers expect in string arguments
    pub fn lon_lat(&self) -> String {
        format!("{},{}", self.lon, self.lat)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// A point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub distance_m: f64,
}

/// Result of a POI search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoiList {
    pub items: Vec<Poi>,
}

impl PoiList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// One manoeuvre of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub distance_m: f64,
}

/// A driving route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub distance_m: f64,
    pub duration_s: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub polyline: String,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// A route with no distance and no steps carries no information
    pub fn is_empty(&self) -> bool {
        self.distance_m == 0.0 && self.duration_s == 0.0 && self.steps.is_empty()
    }
}

/// Parameters of a POI search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiQuery {
    pub center: LatLon,
    pub query: String,
    pub radius_m: u32,
    pub limit: u32,
}

/// Parameters of a route request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub origin: LatLon,
    pub destination: LatLon,
    /// Routing preference, passed through to the peer (e.g. "fastest")
    pub mode: String,
    /// Things to avoid (e.g. "tolls"), passed through to the peer
    #[serde(default)]
    pub avoid: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_order() {
        let p = LatLon::new(31.23, 121.47);
        assert_eq!(p.lon_lat(), "121.47,31.23");
    }

    #[test]
    fn test_poi_list_json_shape() {
        let list = PoiList {
            items: vec![Poi {
                name: "Cafe".into(),
                lat: 31.23,
                lon: 121.47,
                address: String::new(),
                distance_m: 600.0,
            }],
        };
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["items"][0]["distance_m"], 600.0);
        assert_eq!(value["items"][0]["address"], "");
    }

    #[test]
    fn test_route_is_empty() {
        assert!(Route::default().is_empty());
        let route = Route {
            distance_m: 10.0,
            ..Route::default()
        };
        assert!(!route.is_empty());
    }
}
