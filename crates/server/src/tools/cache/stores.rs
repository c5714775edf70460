//! cache_stores tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheEntryMeta, Router};

use crate::tools::json_result;

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Name of the current store (the version tag).
    pub current: String,
    /// Every store present in storage, oldest first.
    pub stores: Vec<String>,
    /// Entries of the current store.
    pub entries: Vec<CacheEntryMeta>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(router: &Router) -> Result<CallToolResult, McpError> {
    let output = CacheStoresOutput {
        current: router.version().to_string(),
        stores: router.store_names().await?,
        entries: router.entries().await?,
    };
    json_result(&output)
}
