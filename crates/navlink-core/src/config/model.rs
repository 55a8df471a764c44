//! Configuration model

use super::error::{ConfigError, ConfigResult};
use crate::mcp::{ClientInfo, Framing, McpError, ProcessCommand};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Command used when none is configured
pub const DEFAULT_MCP_COMMAND: &str = "npx -y -p @amap/amap-maps-mcp-server mcp-amap";

fn default_command() -> String {
    DEFAULT_MCP_COMMAND.to_string()
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_total_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_shutdown_grace() -> Duration {
    ProcessCommand::DEFAULT_SHUTDOWN_GRACE
}

fn default_client_name() -> String {
    ClientInfo::default().name
}

fn default_client_version() -> String {
    ClientInfo::default().version
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavConfig {
    /// Which provider serves navigation calls
    #[serde(default)]
    pub provider: ProviderKind,
    /// Settings for the MCP provider
    #[serde(default)]
    pub mcp: McpProviderConfig,
}

impl NavConfig {
    /// Check values that would make every call fail
    pub fn validate(&self) -> ConfigResult<()> {
        self.mcp.validate()
    }
}

/// Navigation provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Canned results, no external process
    Stub,
    /// AMap tool provider over stdio MCP
    #[default]
    #[serde(alias = "amap_mcp")]
    AmapMcp,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::AmapMcp => "amap-mcp",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stub" => Ok(Self::Stub),
            "amap-mcp" | "amap_mcp" => Ok(Self::AmapMcp),
            other => Err(ConfigError::invalid(format!("unknown provider: {}", other))),
        }
    }
}

/// Which framings to try, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    /// Line-delimited, then length-prefixed
    #[default]
    #[serde(alias = "auto")]
    PreferLineDelimited,
    /// Length-prefixed, then line-delimited
    PreferLengthPrefixed,
    #[serde(alias = "ndjson")]
    LineDelimitedOnly,
    #[serde(alias = "content_length")]
    LengthPrefixedOnly,
}

impl TransportMode {
    /// Framing candidates in the order they are tried
    pub fn candidates(&self) -> &'static [Framing] {
        match self {
            Self::PreferLineDelimited => &[Framing::LineDelimited, Framing::LengthPrefixed],
            Self::PreferLengthPrefixed => &[Framing::LengthPrefixed, Framing::LineDelimited],
            Self::LineDelimitedOnly => &[Framing::LineDelimited],
            Self::LengthPrefixedOnly => &[Framing::LengthPrefixed],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreferLineDelimited => "prefer-line-delimited",
            Self::PreferLengthPrefixed => "prefer-length-prefixed",
            Self::LineDelimitedOnly => "line-delimited-only",
            Self::LengthPrefixedOnly => "length-prefixed-only",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefer-line-delimited" | "auto" => Ok(Self::PreferLineDelimited),
            "prefer-length-prefixed" => Ok(Self::PreferLengthPrefixed),
            "line-delimited-only" | "ndjson" => Ok(Self::LineDelimitedOnly),
            "length-prefixed-only" | "content_length" | "content-length" => {
                Ok(Self::LengthPrefixedOnly)
            }
            other => Err(ConfigError::invalid(format!(
                "unknown transport mode: {}",
                other
            ))),
        }
    }
}

/// MCP provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpProviderConfig {
    /// Command line that starts the tool provider
    #[serde(default = "default_command")]
    pub command: String,
    /// Extra environment for the provider process
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// How long one response may take
    #[serde(default = "default_read_timeout", with = "humantime_serde")]
    pub read_timeout: Duration,
    /// Budget for a whole call across all transports
    #[serde(default = "default_total_timeout", with = "humantime_serde")]
    pub total_timeout: Duration,
    /// Wait between termination request and kill
    #[serde(default = "default_shutdown_grace", with = "humantime_serde")]
    pub shutdown_grace: Duration,
    #[serde(default)]
    pub transport: TransportMode,
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_client_version")]
    pub client_version: String,
}

impl Default for McpProviderConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            env: HashMap::new(),
            read_timeout: default_read_timeout(),
            total_timeout: default_total_timeout(),
            shutdown_grace: default_shutdown_grace(),
            transport: TransportMode::default(),
            client_name: default_client_name(),
            client_version: default_client_version(),
        }
    }
}

impl McpProviderConfig {
    /// Whether a non-blank command is configured
    pub fn command_configured(&self) -> bool {
        !self.command.trim().is_empty()
    }

    /// Parse the command line; a blank command is a configuration error
    pub fn process_command(&self) -> Result<ProcessCommand, McpError> {
        Ok(ProcessCommand::parse(&self.command, self.env.clone())?
            .with_shutdown_grace(self.shutdown_grace))
    }

    /// Identity announced in the handshake
    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            name: self.client_name.clone(),
            version: self.client_version.clone(),
        }
    }

    /// Check timeouts; a blank command is reported at call time instead
    pub fn validate(&self) -> ConfigResult<()> {
        if self.read_timeout.is_zero() {
            return Err(ConfigError::invalid("mcp.read_timeout must be greater than zero"));
        }
        if self.total_timeout.is_zero() {
            return Err(ConfigError::invalid("mcp.total_timeout must be greater than zero"));
        }
        Ok(())
    }
}
