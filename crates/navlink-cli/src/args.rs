//! CLI argument definitions using clap
//!
//! - navlink poi --lat 31.23 --lon 121.47 coffee
//! - navlink route --from 31.23,121.47 --to 31.20,121.44
//! - navlink tools / config show / debug

use clap::{Args, Parser, Subcommand, ValueEnum};
use navlink_core::{LatLon, ProviderKind, TransportMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "navlink")]
#[command(about = "Query a map tool provider over stdio MCP")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (JSON, TOML or YAML)
    #[arg(long, global = true, env = "NAVLINK_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Provider command line, overrides configuration
    #[arg(long, global = true)]
    pub command: Option<String>,

    /// Transport mode, overrides configuration
    #[arg(long, global = true)]
    pub transport: Option<TransportMode>,

    /// Provider, overrides configuration
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command_kind: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search points of interest around a location
    Poi(PoiArgs),

    /// Plan a driving route
    Route(RouteArgs),

    /// List the tools the provider advertises
    Tools,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show provider diagnostics
    Debug {
        /// List tools first so the snapshot reflects a live call
        #[arg(long)]
        probe: bool,
    },
}

#[derive(Args)]
pub struct PoiArgs {
    /// What to look for
    pub query: String,

    /// Centre latitude
    #[arg(long, default_value_t = 31.23, allow_negative_numbers = true)]
    pub lat: f64,

    /// Centre longitude
    #[arg(long, default_value_t = 121.47, allow_negative_numbers = true)]
    pub lon: f64,

    /// Search radius in metres
    #[arg(long, default_value_t = 1000)]
    pub radius: u32,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(Args)]
pub struct RouteArgs {
    /// Origin as "lat,lon"
    #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
    pub from: LatLon,

    /// Destination as "lat,lon"
    #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
    pub to: LatLon,

    /// Routing preference passed to the provider
    #[arg(long, default_value = "fastest")]
    pub mode: String,

    /// Things to avoid (repeatable)
    #[arg(long)]
    pub avoid: Vec<String>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Display the effective configuration
    Show,

    /// Validate configuration and the provider command
    Validate,
}

fn parse_lat_lon(s: &str) -> Result<LatLon, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {:?}", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    Ok(LatLon::new(lat, lon))
}
