//! Provider diagnostics shared with status endpoints

use crate::mcp::Framing;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the last call was served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMark {
    LineDelimited,
    LengthPrefixed,
    /// Every transport failed; the caller had to fall back on its own
    Fallback,
}

impl From<Framing> for TransportMark {
    fn from(framing: Framing) -> Self {
        match framing {
            Framing::LineDelimited => Self::LineDelimited,
            Framing::LengthPrefixed => Self::LengthPrefixed,
        }
    }
}

/// Point-in-time copy of the provider's diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub provider_mode: String,
    pub command_configured: bool,
    pub last_transport: Option<TransportMark>,
    /// Text of the most recent failure; cleared by the next success
    pub last_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shared handle to a provider's debug state
pub type SharedDebugState = Arc<ProviderDebugState>;

/// Last-write-wins diagnostics cell
#[derive(Debug)]
pub struct ProviderDebugState {
    inner: RwLock<DebugSnapshot>,
}

impl ProviderDebugState {
    pub fn new(provider_mode: impl Into<String>, command_configured: bool) -> Self {
        Self {
            inner: RwLock::new(DebugSnapshot {
                provider_mode: provider_mode.into(),
                command_configured,
                last_transport: None,
                last_error: None,
                updated_at: None,
            }),
        }
    }

    /// Create a shared (Arc-wrapped) state
    pub fn shared(provider_mode: impl Into<String>, command_configured: bool) -> SharedDebugState {
        Arc::new(Self::new(provider_mode, command_configured))
    }

    pub fn record_success(&self, transport: TransportMark) {
        let mut state = self.inner.write();
        state.last_transport = Some(transport);
        state.last_error = None;
        state.updated_at = Some(Utc::now());
    }

    pub fn record_failure(&self, error: impl ToString) {
        let mut state = self.inner.write();
        state.last_transport = Some(TransportMark::Fallback);
        state.last_error = Some(error.to_string());
        state.updated_at = Some(Utc::now());
    }

    pub fn snapshot(&self) -> DebugSnapshot {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let state = ProviderDebugState::new("amap-mcp", true);
        let snap = state.snapshot();
        assert_eq!(snap.provider_mode, "amap-mcp");
        assert!(snap.command_configured);
        assert!(snap.last_transport.is_none());
        assert!(snap.updated_at.is_none());
    }

    #[test]
    fn test_success_clears_error() {
        let state = ProviderDebugState::new("amap-mcp", true);
        state.record_failure("MCP header read timeout after 8s");
        assert_eq!(state.snapshot().last_transport, Some(TransportMark::Fallback));

        state.record_success(Framing::LengthPrefixed.into());
        let snap = state.snapshot();
        assert_eq!(snap.last_transport, Some(TransportMark::LengthPrefixed));
        assert!(snap.last_error.is_none());
        assert!(snap.updated_at.is_some());
    }

    #[test]
    fn test_snapshot_json() {
        let state = ProviderDebugState::new("amap-mcp", false);
        state.record_success(TransportMark::LineDelimited);
        let value = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(value["last_transport"], "line-delimited");
        assert_eq!(value["command_configured"], false);
    }
}
