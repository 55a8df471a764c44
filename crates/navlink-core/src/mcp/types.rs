//! MCP type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server information returned after initialization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerInfo {
    /// Server name
    #[serde(default)]
    pub name: String,
    /// Server version
    #[serde(default)]
    pub version: String,
}

/// MCP tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    /// Tool name
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: Option<String>,
    /// Input schema (JSON Schema)
    #[serde(default)]
    pub input_schema: Value,
}

impl McpTool {
    /// Create a new MCP tool
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: Value::Object(Map::new()),
        }
    }

    /// Read the `tools` list out of a `tools/list` result.
    ///
    /// Entries without a string `name` are skipped; a missing or non-list
    /// `tools` field yields an empty list.
    pub fn list_from_result(result: &Map<String, Value>) -> Vec<McpTool> {
        let Some(Value::Array(entries)) = result.get("tools") else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name")?.as_str()?;
                Some(McpTool {
                    name: name.to_string(),
                    description: entry
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    input_schema: entry.get("inputSchema").cloned().unwrap_or(Value::Null),
                })
            })
            .collect()
    }
}

impl AsRef<str> for McpTool {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// MCP tool execution result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolResult {
    /// Result content, kept raw; items are interpreted one by one
    #[serde(default)]
    pub content: Vec<Value>,
    /// Whether the execution produced an error
    #[serde(default)]
    pub is_error: bool,
}

/// Content types in tool results that carry data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum McpContent {
    /// Structured JSON content
    Json { json: Value },
    /// Text content
    Text { text: String },
    /// Image, resource and anything else
    #[serde(other)]
    Other,
}

impl McpToolResult {
    /// Interpret a `tools/call` result object. A missing or non-list
    /// `content` field is read as empty content.
    pub fn from_result(result: &Map<String, Value>) -> Self {
        Self {
            content: match result.get("content") {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            },
            is_error: result
                .get("isError")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// First JSON object carried by the content list.
    ///
    /// An explicit `json` item wins; otherwise the first `text` item whose
    /// text parses as a JSON object. Items that do not decode are skipped.
    pub fn first_json_object(&self) -> Option<Map<String, Value>> {
        let items: Vec<McpContent> = self
            .content
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect();

        let explicit = items.iter().find_map(|item| match item {
            McpContent::Json {
                json: Value::Object(obj),
            } => Some(obj.clone()),
            _ => None,
        });
        if explicit.is_some() {
            return explicit;
        }

        items.iter().find_map(|item| match item {
            McpContent::Text { text } if !text.trim().is_empty() => {
                match serde_json::from_str::<Value>(text) {
                    Ok(Value::Object(obj)) => Some(obj),
                    _ => None,
                }
            }
            _ => None,
        })
    }

    /// Text of the content items, for error reporting
    pub fn text_summary(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version
    pub protocol_version: String,
    /// Client capabilities; always sent empty
    pub capabilities: Map<String, Value>,
    /// Client info
    pub client_info: ClientInfo,
}

/// Client information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name
    pub name: String,
    /// Client version
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "navlink".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Initialize response; only the parts worth logging are read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version
    #[serde(default)]
    pub protocol_version: Option<String>,
    /// Server info
    #[serde(default)]
    pub server_info: McpServerInfo,
}
