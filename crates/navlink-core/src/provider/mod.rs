//! Navigation providers
//!
//! [`NavProvider`] is the boundary the rest of a navigation service talks to.
//! [`McpNavProvider`] drives an external MCP tool provider; [`StubProvider`]
//! answers with canned data.

pub mod arguments;
pub mod canonical;
pub mod debug_state;
pub mod mcp_provider;
pub mod negotiator;
pub mod resolver;
pub mod stub;
pub mod types;

pub use debug_state::{DebugSnapshot, ProviderDebugState, SharedDebugState, TransportMark};
pub use mcp_provider::McpNavProvider;
pub use resolver::ToolCapability;
pub use stub::StubProvider;
pub use types::{LatLon, Poi, PoiList, PoiQuery, Route, RouteQuery, RouteStep};

use crate::config::{NavConfig, ProviderKind};
use crate::mcp::McpError;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of POI and route data
#[async_trait]
pub trait NavProvider: Send + Sync {
    /// Provider mode name
    fn name(&self) -> &str;

    /// Points of interest around a centre
    async fn search_poi(&self, query: &PoiQuery) -> Result<PoiList, McpError>;

    /// Driving route between two points
    async fn plan_route(&self, query: &RouteQuery) -> Result<Route, McpError>;

    /// Diagnostics for status endpoints
    fn debug_snapshot(&self) -> DebugSnapshot;
}

/// Build the provider selected by `config`
pub fn build_provider(config: &NavConfig) -> Arc<dyn NavProvider> {
    match config.provider {
        ProviderKind::Stub => Arc::new(StubProvider::new()),
        ProviderKind::AmapMcp => Arc::new(McpNavProvider::new(config.mcp.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_provider_by_kind() {
        let mut config = NavConfig::default();
        assert_eq!(build_provider(&config).name(), "amap-mcp");

        config.provider = ProviderKind::Stub;
        let provider = build_provider(&config);
        assert_eq!(provider.name(), "stub");
        assert_eq!(provider.debug_snapshot().provider_mode, "stub");
    }
}
