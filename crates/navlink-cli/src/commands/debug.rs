//! Provider diagnostics

use super::print_json;
use anyhow::Result;
use navlink_core::{McpNavProvider, NavConfig, NavProvider, ProviderKind, StubProvider};
use serde_json::json;

/// Print the provider's debug snapshot, optionally after a live `tools/list`
pub async fn show(config: &NavConfig, probe: bool) -> Result<()> {
    let snapshot = match config.provider {
        ProviderKind::Stub => StubProvider::new().debug_snapshot(),
        ProviderKind::AmapMcp => {
            let provider = McpNavProvider::new(config.mcp.clone());
            if probe {
                // The outcome is recorded in the snapshot either way
                if let Err(e) = provider.list_tools().await {
                    tracing::debug!(error = %e, "probe failed");
                }
            }
            provider.debug_snapshot()
        }
    };

    print_json(&json!({
        "provider_mode": snapshot.provider_mode,
        "command_configured": snapshot.command_configured,
        "last_transport": snapshot.last_transport,
        "last_mcp_error": snapshot.last_error,
        "updated_at": snapshot.updated_at,
        "transport_mode": config.mcp.transport,
        "read_timeout": format!("{:?}", config.mcp.read_timeout),
        "total_timeout": format!("{:?}", config.mcp.total_timeout),
    }))
}
