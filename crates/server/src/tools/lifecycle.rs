//! sw_install, sw_activate and sw_status tool implementations.
//!
//! These deliver the host's install and activate events to the router.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;
use shellcache_core::{LifecycleState, Router};

use super::json_result;

/// Output from the sw_activate tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ActivateOutput {
    pub version: String,
    pub state: LifecycleState,
    /// Stores deleted because their name differs from the version tag.
    pub purged: Vec<String>,
}

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct StatusOutput {
    pub version: String,
    pub scope: String,
    pub state: LifecycleState,
    /// Entries in the current store.
    pub entries: u64,
    /// Every store present in storage.
    pub stores: Vec<String>,
}

/// Seed the current store; activates too when skip_waiting is configured.
pub async fn install_impl(router: &Router) -> Result<CallToolResult, McpError> {
    let report = router.install().await?;
    json_result(&report)
}

/// Purge stale stores and start serving.
pub async fn activate_impl(router: &Router) -> Result<CallToolResult, McpError> {
    let purged = router.reconcile().await?;
    let output = ActivateOutput { version: router.version().to_string(), state: router.state(), purged };
    json_result(&output)
}

pub async fn status_impl(router: &Router) -> Result<CallToolResult, McpError> {
    let output = StatusOutput {
        version: router.version().to_string(),
        scope: router.options().scope.base().to_string(),
        state: router.state(),
        entries: router.entry_count().await?,
        stores: router.store_names().await?,
    };
    json_result(&output)
}
