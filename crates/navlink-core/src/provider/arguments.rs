//! Argument shapes to try per tool
//!
//! Peers rarely publish a schema that matches their behaviour, so each tool
//! gets an ordered list of plausible argument objects. Well-known tools get
//! their documented shapes; anything else gets a spread of common guesses.

use super::types::{PoiQuery, RouteQuery};
use serde_json::{Value, json};

/// City value meaning "search nationwide"
pub const NATIONWIDE_CITY: &str = "全国";

/// Candidate arguments for a POI search tool, in order
pub fn poi_candidates(tool: &str, query: &PoiQuery) -> Vec<Value> {
    let location = query.center.lon_lat();

    match tool {
        "maps_around_search" => vec![
            json!({
                "keywords": query.query,
                "location": location,
                "radius": query.radius_m,
                "page_size": query.limit,
            }),
            json!({
                "keywords": query.query,
                "location": location,
                "radius": query.radius_m,
            }),
        ],
        "maps_text_search" => vec![
            json!({
                "keywords": query.query,
                "city": NATIONWIDE_CITY,
                "page_size": query.limit,
            }),
            json!({ "keywords": query.query }),
        ],
        _ => vec![
            json!({
                "query": query.query,
                "center": query.center,
                "radius_m": query.radius_m,
                "limit": query.limit,
            }),
            json!({
                "keywords": query.query,
                "location": location,
                "radius": query.radius_m,
                "page_size": query.limit,
            }),
            json!({
                "keyword": query.query,
                "location": location,
                "radius": query.radius_m,
                "limit": query.limit,
            }),
        ],
    }
}

/// Candidate arguments for a route tool, in order
pub fn route_candidates(tool: &str, query: &RouteQuery) -> Vec<Value> {
    let origin = query.origin.lon_lat();
    let destination = query.destination.lon_lat();

    match tool {
        "maps_direction_driving" => vec![
            json!({ "origin": origin, "destination": destination }),
            json!({ "origin": origin, "destination": destination, "strategy": 0 }),
        ],
        _ => vec![
            json!({
                "origin": query.origin,
                "destination": query.destination,
                "mode": query.mode,
                "avoid": query.avoid,
            }),
            json!({ "origin": origin, "destination": destination, "strategy": query.mode }),
            json!({ "from": origin, "to": destination, "mode": query.mode }),
        ],
    }
}
