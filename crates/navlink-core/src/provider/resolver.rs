//! Tool name resolution
//!
//! Peers name their tools freely, so a capability is described by a list of
//! keyword sets tried in order. A set matches a tool either exactly (the tool
//! name is one of the keywords) or fuzzily (the lowercased name contains every
//! keyword).

use crate::mcp::McpError;
use std::fmt;

/// Pick a tool name for one keyword set.
///
/// Exact matches win over fuzzy ones; among several fuzzy matches the first
/// in the peer's order wins.
pub fn resolve<'a, T: AsRef<str>>(names: &'a [T], keywords: &[&str]) -> Option<&'a str> {
    let names: Vec<&'a str> = names.iter().map(|n| n.as_ref()).collect();

    if let Some(exact) = names.iter().copied().find(|name| keywords.contains(name)) {
        return Some(exact);
    }

    if keywords.is_empty() {
        return None;
    }

    names.into_iter().find(|name| {
        let lower = name.to_lowercase();
        keywords.iter().all(|k| lower.contains(&k.to_lowercase()))
    })
}

/// What a tool is needed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCapability {
    PoiSearch,
    DrivingRoute,
}

impl ToolCapability {
    /// Keyword sets, most specific first
    pub fn keyword_sets(&self) -> &'static [&'static [&'static str]] {
        match self {
            Self::PoiSearch => &[
                &["maps_around_search"],
                &["maps_text_search"],
                &["poi", "search"],
                &["around", "search"],
                &["poi"],
            ],
            Self::DrivingRoute => &[
                &["maps_direction_driving"],
                &["route", "plan"],
                &["direction", "driving"],
                &["route"],
            ],
        }
    }

    /// Human-readable name for errors and logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::PoiSearch => "poi search",
            Self::DrivingRoute => "route",
        }
    }

    /// First tool matching any keyword set, sets tried in order
    pub fn resolve<'a, T: AsRef<str>>(&self, names: &'a [T]) -> Result<&'a str, McpError> {
        self.keyword_sets()
            .iter()
            .find_map(|keywords| resolve(names, keywords))
            .ok_or_else(|| {
                let offered: Vec<String> =
                    names.iter().map(|n| n.as_ref().to_string()).collect();
                McpError::resolution(self.label(), &offered)
            })
    }
}

impl fmt::Display for ToolCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let names = ["maps_around_search", "other"];
        assert_eq!(resolve(&names, &["maps_around_search"]), Some("maps_around_search"));
    }

    #[test]
    fn test_fuzzy_requires_every_token() {
        assert_eq!(resolve(&["poi_search_v2"], &["poi", "search"]), Some("poi_search_v2"));
        assert_eq!(resolve(&["poi_only"], &["poi", "search"]), None);
    }

    #[test]
    fn test_fuzzy_is_case_insensitive_and_keeps_peer_order() {
        let names = ["Route_Plan_Fast", "route_plan"];
        assert_eq!(resolve(&names, &["route", "plan"]), Some("Route_Plan_Fast"));
    }

    #[test]
    fn test_exact_beats_earlier_fuzzy() {
        let names = ["poi_lookup", "poi"];
        assert_eq!(resolve(&names, &["poi"]), Some("poi"));
    }

    #[test]
    fn test_empty_inputs() {
        let none: [&str; 0] = [];
        assert_eq!(resolve(&none, &["poi"]), None);
        assert_eq!(resolve(&["poi"], &[]), None);
    }

    #[test]
    fn test_capability_prefers_known_names() {
        let names = vec![
            "maps_text_search".to_string(),
            "maps_around_search".to_string(),
        ];
        assert_eq!(ToolCapability::PoiSearch.resolve(&names).unwrap(), "maps_around_search");

        let names = ["maps_geo", "direction_driving_v3"];
        assert_eq!(
            ToolCapability::DrivingRoute.resolve(&names).unwrap(),
            "direction_driving_v3"
        );
    }

    #[test]
    fn test_capability_without_match_is_resolution_error() {
        let names = ["maps_weather", "maps_geo"];
        let err = ToolCapability::DrivingRoute.resolve(&names).unwrap_err();
        assert!(matches!(err, McpError::Resolution { .. }));
        assert!(err.to_string().contains("maps_weather, maps_geo"));
        assert!(err.is_recoverable());
    }
}
