//! Request classification and per-class fallback policy.

use serde::{Deserialize, Serialize};

use crate::http::{InterceptedRequest, Scope};

/// What a resource request receives when the network fails or answers non-2xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Serve the cached shell document.
    #[default]
    Shell,
    /// Hand back the failing response, or surface the network error.
    Propagate,
}

/// Routing class of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    Navigation,
    Api,
    Asset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Scope-relative path prefixes, stored without a leading `./` or `/`.
    api_prefixes: Vec<String>,
    pub api: FallbackMode,
    pub asset: FallbackMode,
}

impl FallbackPolicy {
    pub fn new(api_prefixes: &[String], api: FallbackMode, asset: FallbackMode) -> Self {
        let api_prefixes = api_prefixes
            .iter()
            .map(|p| p.trim().trim_start_matches("./").trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { api_prefixes, api, asset }
    }

    /// Navigation first, then API (JSON accept or configured prefix), else asset.
    pub fn classify(&self, scope: &Scope, request: &InterceptedRequest) -> RequestClass {
        if request.is_navigation() {
            return RequestClass::Navigation;
        }
        if request.accepts("application/json") {
            return RequestClass::Api;
        }
        if let Some(path) = scope.relative_path(&request.url)
            && self.api_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
        {
            return RequestClass::Api;
        }
        RequestClass::Asset
    }

    /// Fallback mode for a class. Navigations have their own offline page path
    /// and always report `Shell`.
    pub fn mode_for(&self, class: RequestClass) -> FallbackMode {
        match class {
            RequestClass::Navigation => FallbackMode::Shell,
            RequestClass::Api => self.api,
            RequestClass::Asset => self.asset,
        }
    }
}
