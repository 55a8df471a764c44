//! Configuration management for navlink

mod error;

pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ConfigSource};
pub use model::{McpProviderConfig, NavConfig, ProviderKind, TransportMode};
