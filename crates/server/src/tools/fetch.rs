//! sw_fetch tool implementation.
//!
//! Delivers one intercepted request to the router and returns whatever it
//! resolves to. Errors returned here mean the host should treat the request
//! as a network failure.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{InterceptedRequest, RequestMode, Router};

use super::json_result;
use crate::error::ToolError;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Request URL; relative URLs resolve against the router scope.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin", "no-cors" or "cors" (default).
    #[serde(default)]
    pub mode: RequestMode,

    /// Optional Accept header, used to detect HTML navigations.
    #[serde(default)]
    pub accept: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// Absolute request URL after resolution.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_len: usize,
    /// Where the response came from: cache, network, shell_fallback, offline_page or passthrough.
    pub source: String,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(router: &Router, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let url = router.resolve_url(&params.url)?;
    let mut request = InterceptedRequest::get(url)
        .with_method(&params.method)
        .with_mode(params.mode);
    if let Some(accept) = params.accept {
        request = request.with_accept(accept);
    }

    let resolution = router.resolve(&request).await?;
    let response = resolution.response;

    let output = SwFetchOutput {
        url: request.url.to_string(),
        status: response.status,
        status_text: response.status_text.clone(),
        content_type: response.content_type().map(str::to_string),
        body: response.text(),
        body_len: response.body.len(),
        headers: response.headers,
        source: resolution.source.as_str().to_string(),
    };
    json_result(&output)
}
