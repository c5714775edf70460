//! MCP tool implementations.
//!
//! Each tool is one host lifecycle hook or cache inspection call routed to
//! the shared `Router`.

pub mod cache;
pub mod fetch;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod test_support;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Wrap a serializable tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::OutputFailed(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
