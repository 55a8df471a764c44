//! Navigation provider backed by an MCP tool-provider process
//!
//! Every call opens a fresh session per framing candidate, bounded by one
//! total budget, and closes it before moving on or returning.

use super::arguments::{poi_candidates, route_candidates};
use super::canonical::{to_poi_list, to_route};
use super::debug_state::{DebugSnapshot, ProviderDebugState, SharedDebugState};
use super::negotiator::negotiate;
use super::resolver::ToolCapability;
use super::types::{PoiList, PoiQuery, Route, RouteQuery};
use super::NavProvider;
use crate::config::{McpProviderConfig, ProviderKind};
use crate::mcp::{McpError, McpSession, McpTool, ProcessCommand, SessionOptions};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// One unit of work run inside an initialized session
#[async_trait]
trait SessionTask: Send + Sync {
    type Output: Send;

    /// Operation name for errors and logs
    fn operation(&self) -> &'static str;

    async fn run(&self, session: &mut McpSession) -> Result<Self::Output, McpError>;
}

struct PoiTask<'a> {
    query: &'a PoiQuery,
}

#[async_trait]
impl SessionTask for PoiTask<'_> {
    type Output = PoiList;

    fn operation(&self) -> &'static str {
        "poi"
    }

    async fn run(&self, session: &mut McpSession) -> Result<PoiList, McpError> {
        let tools = session.list_tools().await?;
        let tool = ToolCapability::PoiSearch.resolve(&tools)?;
        let candidates = poi_candidates(tool, self.query);
        let result = negotiate(session, tool, &candidates).await?;

        let list = result
            .first_json_object()
            .map(|raw| to_poi_list(&raw))
            .unwrap_or_default();
        if list.is_empty() {
            warn!(tool, "POI search produced no usable items");
        }
        Ok(list)
    }
}

struct RouteTask<'a> {
    query: &'a RouteQuery,
}

#[async_trait]
impl SessionTask for RouteTask<'_> {
    type Output = Route;

    fn operation(&self) -> &'static str {
        "route"
    }

    async fn run(&self, session: &mut McpSession) -> Result<Route, McpError> {
        let tools = session.list_tools().await?;
        let tool = ToolCapability::DrivingRoute.resolve(&tools)?;
        let candidates = route_candidates(tool, self.query);
        let result = negotiate(session, tool, &candidates).await?;

        let route = result
            .first_json_object()
            .map(|raw| to_route(&raw))
            .unwrap_or_default();
        if route.is_empty() {
            warn!(tool, "route planning produced an empty route");
        }
        Ok(route)
    }
}

struct ListToolsTask;

#[async_trait]
impl SessionTask for ListToolsTask {
    type Output = Vec<McpTool>;

    fn operation(&self) -> &'static str {
        "tools/list"
    }

    async fn run(&self, session: &mut McpSession) -> Result<Vec<McpTool>, McpError> {
        session.list_tools().await
    }
}

/// Provider facade over a stdio MCP tool provider
pub struct McpNavProvider {
    config: McpProviderConfig,
    debug: SharedDebugState,
}

impl McpNavProvider {
    pub fn new(config: McpProviderConfig) -> Self {
        let debug = ProviderDebugState::shared(
            ProviderKind::AmapMcp.as_str(),
            config.command_configured(),
        );
        Self { config, debug }
    }

    pub fn config(&self) -> &McpProviderConfig {
        &self.config
    }

    /// Tools advertised by the peer
    #[instrument(skip(self))]
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, McpError> {
        self.run_with_fallback(&ListToolsTask).await
    }

    /// Run `task` on each framing candidate until one succeeds or the budget
    /// runs out
    async fn run_with_fallback<T: SessionTask>(&self, task: &T) -> Result<T::Output, McpError> {
        let command = match self.config.process_command() {
            Ok(command) => command,
            Err(e) => {
                self.debug.record_failure(&e);
                return Err(e);
            }
        };

        let budget = self.config.total_timeout;
        let started = Instant::now();
        let budget_deadline = started + budget;
        let mut attempts = 0;
        let mut last: Option<Box<McpError>> = None;

        for &framing in self.config.transport.candidates() {
            let remaining = budget_deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            attempts += 1;
            let options = SessionOptions::new(framing, self.config.read_timeout.min(remaining))
                .with_deadline(budget_deadline)
                .with_client_info(self.config.client_info());

            match attempt(&command, options, task).await {
                Ok(output) => {
                    info!(
                        operation = task.operation(),
                        %framing,
                        attempts,
                        elapsed = ?started.elapsed(),
                        "MCP call succeeded"
                    );
                    self.debug.record_success(framing.into());
                    return Ok(output);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(
                        operation = task.operation(),
                        %framing,
                        code = e.error_code(),
                        error = %e,
                        "MCP attempt failed"
                    );
                    last = Some(Box::new(e));
                }
                Err(e) => {
                    self.debug.record_failure(&e);
                    return Err(e);
                }
            }
        }

        let err = McpError::AllTransportsFailed {
            operation: task.operation().to_string(),
            attempts,
            elapsed: started.elapsed(),
            budget,
            last,
        };
        self.debug.record_failure(&err);
        Err(err)
    }
}

async fn attempt<T: SessionTask>(
    command: &ProcessCommand,
    options: SessionOptions,
    task: &T,
) -> Result<T::Output, McpError> {
    let mut session = McpSession::open(command, options).await?;
    let result = task.run(&mut session).await;
    session.close().await;
    result
}

#[async_trait]
impl NavProvider for McpNavProvider {
    fn name(&self) -> &str {
        ProviderKind::AmapMcp.as_str()
    }

    #[instrument(skip(self, query), fields(query = %query.query, center = %query.center))]
    async fn search_poi(&self, query: &PoiQuery) -> Result<PoiList, McpError> {
        self.run_with_fallback(&PoiTask { query }).await
    }

    #[instrument(skip(self, query), fields(origin = %query.origin, destination = %query.destination))]
    async fn plan_route(&self, query: &RouteQuery) -> Result<Route, McpError> {
        self.run_with_fallback(&RouteTask { query }).await
    }

    fn debug_snapshot(&self) -> DebugSnapshot {
        self.debug.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::debug_state::TransportMark;
    use crate::provider::types::LatLon;

    fn poi_query() -> PoiQuery {
        PoiQuery {
            center: LatLon::new(31.23, 121.47),
            query: "coffee".into(),
            radius_m: 1000,
            limit: 5,
        }
    }

    #[tokio::test]
    async fn test_blank_command_fails_without_attempts() {
        let provider = McpNavProvider::new(McpProviderConfig {
            command: String::new(),
            ..McpProviderConfig::default()
        });

        let err = provider.search_poi(&poi_query()).await.unwrap_err();
        assert!(matches!(err, McpError::Configuration { .. }));

        let snap = provider.debug_snapshot();
        assert!(!snap.command_configured);
        assert_eq!(snap.last_transport, Some(TransportMark::Fallback));
        assert!(snap.last_error.unwrap().contains("empty MCP command"));
    }

    #[tokio::test]
    async fn test_missing_executable_fails_on_every_transport() {
        let provider = McpNavProvider::new(McpProviderConfig {
            command: "/nonexistent/navlink-peer --stdio".into(),
            ..McpProviderConfig::default()
        });

        let err = provider.list_tools().await.unwrap_err();
        match err {
            McpError::AllTransportsFailed { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert!(matches!(last.as_deref(), Some(McpError::Connection { .. })));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
