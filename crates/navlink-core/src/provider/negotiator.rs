//! Argument negotiation

use crate::mcp::protocol::methods;
use crate::mcp::{McpError, McpSession, McpToolResult};
use serde_json::Value;
use tracing::{debug, instrument};

/// Call `tool` with each candidate until the peer accepts one.
///
/// A candidate is rejected by a JSON-RPC error, a malformed result, or a tool
/// result flagged `isError`. Any other failure means the session itself is
/// broken and is returned as is.
#[instrument(skip(session, candidates), fields(candidates = candidates.len()))]
pub async fn negotiate(
    session: &mut McpSession,
    tool: &str,
    candidates: &[Value],
) -> Result<McpToolResult, McpError> {
    let mut last = None;

    for (index, arguments) in candidates.iter().enumerate() {
        let rejection = match session.call_tool(tool, arguments.clone()).await {
            Ok(result) if !result.is_error => {
                debug!(tool, candidate = index, "arguments accepted");
                return Ok(result);
            }
            Ok(result) => McpError::shape(
                methods::TOOLS_CALL,
                format!("{} reported isError: {}", tool, result.text_summary()),
            ),
            Err(e) if e.is_rejection() => e,
            Err(e) => return Err(e),
        };

        debug!(tool, candidate = index, error = %rejection, "arguments rejected");
        last = Some(rejection);
    }

    match last {
        Some(last) => Err(McpError::negotiation(tool, candidates.len(), last)),
        None => Err(McpError::configuration(format!(
            "no argument candidates for {}",
            tool
        ))),
    }
}
