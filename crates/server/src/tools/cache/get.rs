//! cache_get tool implementation.
//!
//! Looks up a GET request in the current store without touching the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{Error, Router};

use crate::error::ToolError;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL of the cached response; relative URLs resolve against the scope.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_len: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(router: &Router, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }

    let url = router.resolve_url(&params.url)?;
    let response = router
        .lookup(&url)
        .await?
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    let output = CacheGetOutput {
        store: router.version().to_string(),
        url: url.to_string(),
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        body: response.text(),
        body_len: response.body.len(),
        headers: response.headers,
    };
    json_result(&output)
}
