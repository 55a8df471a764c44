//! Canned provider for demos and offline development

use super::NavProvider;
use super::debug_state::{DebugSnapshot, ProviderDebugState, SharedDebugState, TransportMark};
use super::types::{Poi, PoiList, PoiQuery, Route, RouteQuery, RouteStep};
use crate::config::ProviderKind;
use crate::mcp::McpError;
use async_trait::async_trait;

/// Provider that answers every call with fixed data
pub struct StubProvider {
    debug: SharedDebugState,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            debug: ProviderDebugState::shared(ProviderKind::Stub.as_str(), false),
        }
    }
}

#[async_trait]
impl NavProvider for StubProvider {
    fn name(&self) -> &str {
        ProviderKind::Stub.as_str()
    }

    async fn search_poi(&self, query: &PoiQuery) -> Result<PoiList, McpError> {
        self.debug.record_success(TransportMark::Fallback);
        let item = Poi {
            name: "(stub) Starbucks".to_string(),
            lat: 31.23,
            lon: 121.47,
            address: "Somewhere".to_string(),
            distance_m: 850.0,
        };
        Ok(PoiList {
            items: std::iter::repeat_n(item, query.limit.min(1) as usize).collect(),
        })
    }

    async fn plan_route(&self, _query: &RouteQuery) -> Result<Route, McpError> {
        self.debug.record_success(TransportMark::Fallback);
        Ok(Route {
            distance_m: 5200.0,
            duration_s: 780.0,
            summary: "(stub) recommended route".to_string(),
            polyline: String::new(),
            steps: vec![RouteStep {
                instruction: "Go straight for 1 km".to_string(),
                distance_m: 1000.0,
            }],
        })
    }

    fn debug_snapshot(&self) -> DebugSnapshot {
        self.debug.snapshot()
    }
}
