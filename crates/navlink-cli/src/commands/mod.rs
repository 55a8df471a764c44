//! CLI commands

pub mod config;
pub mod debug;
pub mod nav;
pub mod tools;

use crate::args::{Cli, Commands};
use anyhow::{Context, Result};
use navlink_core::{ConfigLoader, NavConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Config file used when neither `--config` nor `NAVLINK_CONFIG_FILE` is set
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("navlink").join("config.toml"))
}

/// Load configuration: file, local override, environment, then flags
pub fn load_config(cli: &Cli) -> Result<NavConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone().or_else(default_config_path) {
        tracing::debug!(path = %path.display(), "using config file");
        loader = loader.with_file(path);
    }

    let mut config = loader
        .with_env()
        .load()
        .context("Failed to load configuration")?;

    if let Some(command) = &cli.command {
        config.mcp.command = command.trim().to_string();
    }
    if let Some(transport) = cli.transport {
        config.mcp.transport = transport;
    }
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }

    Ok(config)
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match &cli.command_kind {
        Commands::Poi(args) => nav::poi(&config, args).await,
        Commands::Route(args) => nav::route(&config, args).await,
        Commands::Tools => tools::list(&config).await,
        Commands::Config { action } => config::run(&config, action.clone()),
        Commands::Debug { probe } => debug::show(&config, *probe).await,
    }
}
