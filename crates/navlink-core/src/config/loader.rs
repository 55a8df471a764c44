//! Configuration loading
//!
//! Sources are applied in the order they were added. File sources are merged
//! key by key as JSON trees, so a file only needs the keys it changes;
//! environment sources override individual fields of everything before them.

use super::error::{ConfigError, ConfigResult};
use super::model::NavConfig;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Path of the config file consulted by the CLI when none is given
pub const CONFIG_FILE_ENV: &str = "NAVLINK_CONFIG_FILE";
pub const PROVIDER_ENV: &str = "NAVLINK_PROVIDER";
pub const COMMAND_ENV: &str = "AMAP_MCP_COMMAND";
pub const TRANSPORT_ENV: &str = "NAVLINK_MCP_TRANSPORT";
pub const READ_TIMEOUT_ENV: &str = "NAVLINK_MCP_READ_TIMEOUT_SECS";
pub const TOTAL_TIMEOUT_ENV: &str = "NAVLINK_MCP_TOTAL_TIMEOUT_SECS";

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Configuration file; skipped when missing
    File(PathBuf),
    /// Process environment
    Environment,
    /// Explicit variables, read like the environment
    Variables(HashMap<String, String>),
}

/// Configuration loader with support for multiple sources
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add a file source followed by its local override
    /// (`navlink.toml` -> `navlink.local.toml`)
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let local = local_override_path(&path);
        let loader = self.add_source(ConfigSource::File(path));
        match local {
            Some(local) => loader.add_source(ConfigSource::File(local)),
            None => loader,
        }
    }

    /// Add environment variables source
    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    /// Add explicit variables, applied like environment variables
    pub fn with_vars(self, vars: HashMap<String, String>) -> Self {
        self.add_source(ConfigSource::Variables(vars))
    }

    /// Load configuration from all sources
    pub fn load(self) -> ConfigResult<NavConfig> {
        let mut tree = to_tree(&NavConfig::default())?;

        for source in &self.sources {
            match source {
                ConfigSource::File(path) => {
                    if let Some(file_tree) = load_file(path)? {
                        debug!(path = %path.display(), "merging config file");
                        merge(&mut tree, file_tree);
                    }
                }
                ConfigSource::Environment => {
                    let vars = std::env::vars().filter(|(k, _)| is_known_var(k));
                    tree = apply_vars(tree, vars)?;
                }
                ConfigSource::Variables(map) => {
                    let vars = map.iter().map(|(k, v)| (k.clone(), v.clone()));
                    tree = apply_vars(tree, vars)?;
                }
            }
        }

        let config = from_tree(tree)?;
        config.validate()?;
        Ok(config)
    }
}

/// `dir/name.ext` -> `dir/name.local.ext`
fn local_override_path(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.local.{}", stem, ext),
        None => format!("{}.local", stem),
    };
    Some(path.with_file_name(name))
}

/// Load a file into a JSON tree. JSON, TOML or YAML by extension.
fn load_file(path: &Path) -> ConfigResult<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |format: &'static str, message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        format,
        message,
    };

    let tree = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => {
            toml::from_str::<Value>(&content).map_err(|e| parse_error("TOML", e.to_string()))?
        }
        Some("yaml") | Some("yml") => serde_yaml::from_str::<Value>(&content)
            .map_err(|e| parse_error("YAML", e.to_string()))?,
        _ => serde_json::from_str::<Value>(&content)
            .map_err(|e| parse_error("JSON", e.to_string()))?,
    };

    match tree {
        Value::Object(_) => Ok(Some(tree)),
        // An empty YAML document
        Value::Null => Ok(None),
        _ => Err(parse_error("config", "top level must be a table".to_string())),
    }
}

/// Deep merge `overlay` into `base`; objects merge key by key, anything
/// else replaces
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn is_known_var(name: &str) -> bool {
    matches!(
        name,
        PROVIDER_ENV | COMMAND_ENV | TRANSPORT_ENV | READ_TIMEOUT_ENV | TOTAL_TIMEOUT_ENV
    )
}

fn to_tree(config: &NavConfig) -> ConfigResult<Value> {
    serde_json::to_value(config).map_err(|e| ConfigError::invalid(e.to_string()))
}

fn from_tree(tree: Value) -> ConfigResult<NavConfig> {
    serde_json::from_value(tree).map_err(|e| ConfigError::invalid(e.to_string()))
}

/// Override fields of the tree merged so far
fn apply_vars(
    tree: Value,
    vars: impl IntoIterator<Item = (String, String)>,
) -> ConfigResult<Value> {
    let mut config = from_tree(tree)?;
    for (var, value) in vars {
        apply_var(&mut config, &var, &value)?;
    }
    to_tree(&config)
}

fn apply_var(config: &mut NavConfig, var: &str, value: &str) -> ConfigResult<()> {
    match var {
        PROVIDER_ENV => {
            config.provider = value
                .parse()
                .map_err(|_| ConfigError::invalid_env(var, value))?;
        }
        COMMAND_ENV => config.mcp.command = value.trim().to_string(),
        TRANSPORT_ENV => {
            config.mcp.transport = value
                .parse()
                .map_err(|_| ConfigError::invalid_env(var, value))?;
        }
        READ_TIMEOUT_ENV => config.mcp.read_timeout = parse_secs(var, value)?,
        TOTAL_TIMEOUT_ENV => config.mcp.total_timeout = parse_secs(var, value)?,
        _ => {}
    }
    Ok(())
}

fn parse_secs(var: &str, value: &str) -> ConfigResult<Duration> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_env(var, value))?;
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::invalid_env(var, value))
}
