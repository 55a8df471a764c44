//! navlink core library
//!
//! A stdio MCP client for map tool providers. It negotiates the wire framing,
//! resolves tool names, negotiates argument shapes and normalizes results
//! into canonical POI and route types.

pub mod config;
pub mod mcp;
pub mod provider;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, McpProviderConfig, NavConfig, ProviderKind, TransportMode};
pub use mcp::{Framing, McpError, McpSession, McpTool, ProcessCommand, SessionOptions};
pub use provider::{
    DebugSnapshot, LatLon, McpNavProvider, NavProvider, Poi, PoiList, PoiQuery, Route, RouteQuery,
    RouteStep, StubProvider, TransportMark, build_provider,
};
