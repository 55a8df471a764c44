//! Tools command implementation

use super::print_json;
use anyhow::{Context, Result, bail};
use colored::*;
use navlink_core::{McpNavProvider, NavConfig, ProviderKind};
use serde_json::json;

/// List the tools the provider advertises
pub async fn list(config: &NavConfig) -> Result<()> {
    if config.provider == ProviderKind::Stub {
        bail!("the stub provider has no tools; use --provider amap-mcp");
    }

    let provider = McpNavProvider::new(config.mcp.clone());
    let tools = provider
        .list_tools()
        .await
        .context("Failed to list provider tools")?;

    eprintln!(
        "{} {} tools from {}",
        "ℹ".blue().bold(),
        tools.len(),
        provider.config().command
    );

    let tools: Vec<_> = tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
            })
        })
        .collect();
    print_json(&tools)
}
