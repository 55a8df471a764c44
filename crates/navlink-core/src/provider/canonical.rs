//! Canonicalization of provider results
//!
//! A tool result is first classified into one of a closed set of known shapes,
//! then converted. Classification never fails: anything unknown lands in
//! `Unrecognized` and converts to an empty result. Individual entries that do
//! not type-check are dropped rather than forwarded half-decoded.

use super::types::{Poi, PoiList, Route, RouteStep};
use serde_json::{Map, Value};

/// Summary used when the peer does not name its route
pub const DEFAULT_ROUTE_SUMMARY: &str = "AMap driving route";

/// Name used for POIs without one
pub const DEFAULT_POI_NAME: &str = "POI";

/// Known POI result shapes
#[derive(Debug, Clone, PartialEq)]
pub enum PoiShape<'a> {
    /// `{"items": [...]}` already in canonical form
    Canonical(&'a [Value]),
    /// `{"pois": [{"name", "location": "lon,lat", "address", "distance"}]}`
    Provider(&'a [Value]),
    Unrecognized,
}

impl<'a> PoiShape<'a> {
    pub fn classify(raw: &'a Map<String, Value>) -> Self {
        if let Some(Value::Array(items)) = raw.get("items") {
            return Self::Canonical(items);
        }
        if let Some(Value::Array(pois)) = raw.get("pois") {
            return Self::Provider(pois);
        }
        Self::Unrecognized
    }
}

/// Known route result shapes
#[derive(Debug, Clone, PartialEq)]
pub enum RouteShape<'a> {
    /// Has `distance_m` and `duration_s` at the top level
    Canonical(&'a Map<String, Value>),
    /// First path of `route.paths` or a top-level `paths`
    Provider(&'a Map<String, Value>),
    Unrecognized,
}

impl<'a> RouteShape<'a> {
    pub fn classify(raw: &'a Map<String, Value>) -> Self {
        if raw.contains_key("distance_m") && raw.contains_key("duration_s") {
            return Self::Canonical(raw);
        }

        let paths = raw
            .get("route")
            .and_then(|route| route.get("paths"))
            .or_else(|| raw.get("paths"));

        match paths.and_then(Value::as_array).and_then(|p| p.first()) {
            Some(Value::Object(path)) => Self::Provider(path),
            _ => Self::Unrecognized,
        }
    }
}

/// Convert a raw POI search result
pub fn to_poi_list(raw: &Map<String, Value>) -> PoiList {
    let items = match PoiShape::classify(raw) {
        PoiShape::Canonical(items) => items.iter().filter_map(canonical_poi).collect(),
        PoiShape::Provider(pois) => pois.iter().filter_map(provider_poi).collect(),
        PoiShape::Unrecognized => Vec::new(),
    };
    PoiList { items }
}

/// Convert a raw route result
pub fn to_route(raw: &Map<String, Value>) -> Route {
    match RouteShape::classify(raw) {
        RouteShape::Canonical(route) => Route {
            distance_m: number(route.get("distance_m")),
            duration_s: number(route.get("duration_s")),
            summary: text(route.get("summary")).unwrap_or_else(|| DEFAULT_ROUTE_SUMMARY.to_string()),
            polyline: text(route.get("polyline")).unwrap_or_default(),
            steps: steps(route.get("steps"), "distance_m"),
        },
        RouteShape::Provider(path) => {
            let steps_raw = path.get("steps");
            let polyline = text(path.get("polyline"))
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| joined_step_polylines(steps_raw));
            Route {
                distance_m: number(path.get("distance")),
                duration_s: number(path.get("duration")),
                summary: DEFAULT_ROUTE_SUMMARY.to_string(),
                polyline,
                steps: steps(steps_raw, "distance"),
            }
        }
        RouteShape::Unrecognized => Route::default(),
    }
}

fn canonical_poi(item: &Value) -> Option<Poi> {
    let item = item.as_object()?;
    Some(Poi {
        name: item.get("name")?.as_str()?.to_string(),
        lat: item.get("lat")?.as_f64()?,
        lon: item.get("lon")?.as_f64()?,
        address: text(item.get("address")).unwrap_or_default(),
        distance_m: number(item.get("distance_m")),
    })
}

fn provider_poi(item: &Value) -> Option<Poi> {
    let item = item.as_object()?;
    let (lon, lat) = item
        .get("location")
        .and_then(Value::as_str)
        .and_then(parse_lon_lat)
        .unwrap_or_else(|| {
            (
                number(item.get("lon").or_else(|| item.get("longitude"))),
                number(item.get("lat").or_else(|| item.get("latitude"))),
            )
        });

    Some(Poi {
        name: text(item.get("name"))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_POI_NAME.to_string()),
        lat,
        lon,
        address: text(item.get("address")).unwrap_or_default(),
        distance_m: number(item.get("distance")),
    })
}

fn steps(raw: Option<&Value>, distance_key: &str) -> Vec<RouteStep> {
    let Some(Value::Array(steps)) = raw else {
        return Vec::new();
    };

    steps
        .iter()
        .filter_map(Value::as_object)
        .map(|step| RouteStep {
            instruction: text(step.get("instruction")).unwrap_or_default(),
            distance_m: number(step.get(distance_key)),
        })
        .collect()
}

fn joined_step_polylines(raw: Option<&Value>) -> String {
    let Some(Value::Array(steps)) = raw else {
        return String::new();
    };

    steps
        .iter()
        .filter_map(|step| step.get("polyline").and_then(Value::as_str))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

/// `"lon,lat"` into a pair; `None` unless both halves are finite numbers
fn parse_lon_lat(location: &str) -> Option<(f64, f64)> {
    let (lon, lat) = location.trim().split_once(',')?;
    Some((finite(lon)?, finite(lat)?))
}

/// `str::parse` accepts `NaN` and `inf`, which serialize as `null`
fn finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A number that may arrive as a JSON number or a numeric string; anything
/// else is zero
fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => finite(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_provider_poi() {
        let raw = obj(json!({
            "pois": [{"name": "Cafe", "location": "121.47,31.23", "distance": "600"}]
        }));
        let list = to_poi_list(&raw);
        assert_eq!(list.len(), 1);
        let poi = &list.items[0];
        assert_eq!(poi.name, "Cafe");
        assert_eq!(poi.lon, 121.47);
        assert_eq!(poi.lat, 31.23);
        assert_eq!(poi.distance_m, 600.0);
        assert_eq!(poi.address, "");
    }

    #[test]
    fn test_provider_poi_fallbacks() {
        let raw = obj(json!({
            "pois": [
                {"name": "", "location": "bad", "lon": 121.5, "lat": "31.2", "distance": "far"},
                {"longitude": "120.1", "latitude": 30.3, "address": "West Lake"},
                "not an object"
            ]
        }));
        let list = to_poi_list(&raw);
        assert_eq!(list.len(), 2);
        assert_eq!(list.items[0].name, "POI");
        assert_eq!((list.items[0].lon, list.items[0].lat), (121.5, 31.2));
        assert_eq!(list.items[0].distance_m, 0.0);
        assert_eq!((list.items[1].lon, list.items[1].lat), (120.1, 30.3));
        assert_eq!(list.items[1].address, "West Lake");
    }

    #[test]
    fn test_non_finite_strings_are_rejected() {
        let raw = obj(json!({
            "pois": [
                {"name": "X", "location": "inf,NaN", "lon": "121.4", "lat": "31.1", "distance": "NaN"},
                {"name": "Y", "location": "121.0,infinity", "distance": "-inf"}
            ]
        }));
        let list = to_poi_list(&raw);
        assert_eq!(list.len(), 2);
        assert_eq!((list.items[0].lon, list.items[0].lat), (121.4, 31.1));
        assert_eq!(list.items[0].distance_m, 0.0);
        assert_eq!((list.items[1].lon, list.items[1].lat), (0.0, 0.0));
        assert_eq!(list.items[1].distance_m, 0.0);

        let encoded = serde_json::to_string(&list).unwrap();
        let decoded: PoiList = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_canonical_poi_items_are_type_checked() {
        let raw = obj(json!({
            "items": [
                {"name": "Ok", "lat": 1.0, "lon": 2.0, "address": "a", "distance_m": 3},
                {"name": "No coords"},
                {"name": 7, "lat": 1.0, "lon": 2.0}
            ]
        }));
        let list = to_poi_list(&raw);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items[0].name, "Ok");
        assert_eq!(list.items[0].distance_m, 3.0);
    }

    #[test]
    fn test_unrecognized_poi_shape_is_empty() {
        let raw = obj(json!({"status": "1", "count": "0"}));
        assert_eq!(PoiShape::classify(&raw), PoiShape::Unrecognized);
        assert!(to_poi_list(&raw).is_empty());
    }

    #[test]
    fn test_provider_route() {
        let raw = obj(json!({
            "route": {"paths": [{"distance": "4510", "duration": "1258", "steps": []}]}
        }));
        let route = to_route(&raw);
        assert_eq!(route.distance_m, 4510.0);
        assert_eq!(route.duration_s, 1258.0);
        assert_eq!(route.summary, DEFAULT_ROUTE_SUMMARY);
        assert!(route.steps.is_empty());
    }

    #[test]
    fn test_provider_route_steps_and_polyline() {
        let raw = obj(json!({
            "paths": [{
                "distance": 900,
                "steps": [
                    {"instruction": "Head north", "distance": "400", "polyline": "1,1;1,2"},
                    {"instruction": "Turn left", "distance": 500, "polyline": "1,2;2,2"}
                ]
            }]
        }));
        let route = to_route(&raw);
        assert_eq!(route.duration_s, 0.0);
        assert_eq!(route.polyline, "1,1;1,2;1,2;2,2");
        assert_eq!(
            route.steps,
            vec![
                RouteStep { instruction: "Head north".into(), distance_m: 400.0 },
                RouteStep { instruction: "Turn left".into(), distance_m: 500.0 },
            ]
        );
    }

    #[test]
    fn test_canonical_route_passes_through() {
        let raw = obj(json!({
            "distance_m": 12.5,
            "duration_s": 3,
            "summary": "short hop",
            "polyline": "0,0;1,1",
            "steps": [{"instruction": "Go", "distance_m": 12.5}]
        }));
        let route = to_route(&raw);
        assert_eq!(route.summary, "short hop");
        assert_eq!(route.steps.len(), 1);
        assert_eq!(route.distance_m, 12.5);
    }

    #[test]
    fn test_unrecognized_route_shape_is_empty() {
        let raw = obj(json!({"route": {"paths": []}}));
        assert_eq!(RouteShape::classify(&raw), RouteShape::Unrecognized);
        assert!(to_route(&raw).is_empty());
    }
}
