//! Configuration commands

use super::print_json;
use crate::args::ConfigAction;
use anyhow::{Result, bail};
use colored::*;
use navlink_core::{NavConfig, ProviderKind};

pub fn run(config: &NavConfig, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print_json(config),
        ConfigAction::Validate => validate(config),
    }
}

fn validate(config: &NavConfig) -> Result<()> {
    config.validate()?;

    if config.provider == ProviderKind::AmapMcp {
        let command = config.mcp.process_command()?;
        println!("{} provider command: {}", "✓".green().bold(), command.display());
    }

    println!(
        "{} provider {}, transport {}, read timeout {:?}, budget {:?}",
        "✓".green().bold(),
        config.provider,
        config.mcp.transport,
        config.mcp.read_timeout,
        config.mcp.total_timeout
    );

    if config.mcp.read_timeout > config.mcp.total_timeout {
        bail!("mcp.read_timeout exceeds mcp.total_timeout; only one attempt can ever run");
    }
    Ok(())
}
