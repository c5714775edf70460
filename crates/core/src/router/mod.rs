//! The Request Router.
//!
//! Owns the current Cache Store (named by the version tag) and exposes three
//! entry points that a host adapter drives:
//!
//! - [`Router::seed`]: fetch every asset and store them, all or nothing.
//! - [`Router::reconcile`]: delete every store not named by the version tag.
//! - [`Router::resolve`]: answer one intercepted request.
//!
//! ### Resolution policy
//! - Navigation-like requests are answered with the cached shell document,
//!   then the network, then the constant offline page.
//! - Everything else is cache-first: a hit never touches the network; a miss
//!   makes exactly one network attempt. Same-origin 2xx GET responses are
//!   written through. Failures fall back per request class (see [`policy`]).
//! - Until the router is activated, requests pass straight to the network.

pub mod lifecycle;
pub mod policy;

#[cfg(test)]
pub(crate) mod testing;

pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleState, Transition};
pub use policy::{FallbackMode, FallbackPolicy, RequestClass};

use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::Error;
use crate::cache::{CacheEntryMeta, CacheStorage};
use crate::config::{AppConfig, ConfigError};
use crate::http::{CapturedResponse, InterceptedRequest, Scope};
use crate::network::Network;

/// Resolved, validated router settings.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Version tag; the current store's name.
    pub version: String,
    pub scope: Scope,
    /// Absolute asset URLs in configured order, without duplicates.
    pub assets: Vec<Url>,
    /// Absolute shell document URL.
    pub shell: Url,
    pub skip_waiting: bool,
    pub policy: FallbackPolicy,
}

impl RouterOptions {
    /// Build options from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` under the same rules as [`AppConfig::validate`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scope = config.scope()?;

        let mut assets: Vec<Url> = Vec::with_capacity(config.assets.len());
        for asset in &config.assets {
            let url = scope
                .resolve(asset)
                .map_err(|e| ConfigError::Invalid { field: "assets".into(), reason: e.to_string() })?;
            if !assets.contains(&url) {
                assets.push(url);
            }
        }
        let shell = scope
            .resolve(&config.shell_path)
            .map_err(|e| ConfigError::Invalid { field: "shell_path".into(), reason: e.to_string() })?;

        Ok(Self {
            version: config.version.clone(),
            scope,
            assets,
            shell,
            skip_waiting: config.skip_waiting,
            policy: FallbackPolicy::new(&config.api_prefixes, config.api_fallback, config.asset_fallback),
        })
    }
}

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Current Cache Store.
    Cache,
    /// Network, possibly written through to the cache.
    Network,
    /// Cached shell document substituted for a failed resource request.
    ShellFallback,
    /// Constant offline page for a navigation with no shell and no network.
    OfflinePage,
    /// Router not active; network response handed back untouched.
    Passthrough,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::ShellFallback => "shell_fallback",
            ResponseSource::OfflinePage => "offline_page",
            ResponseSource::Passthrough => "passthrough",
        }
    }
}

/// Outcome of [`Router::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub response: CapturedResponse,
    pub source: ResponseSource,
}

impl Resolution {
    fn new(response: CapturedResponse, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Outcome of [`Router::install`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub version: String,
    /// Entries written by the seed.
    pub seeded: usize,
    pub state: LifecycleState,
    /// Stores deleted by the activation that followed, if any.
    pub purged: Vec<String>,
}

/// Cache-first request router over injected storage and network services.
pub struct Router {
    options: RouterOptions,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    lifecycle: Lifecycle,
}

impl Router {
    pub fn new(options: RouterOptions, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Self {
        Self { options, storage, network, lifecycle: Lifecycle::new() }
    }

    pub fn version(&self) -> &str {
        &self.options.version
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    /// Resolve a URL as written by a page (relative to the scope).
    pub fn resolve_url(&self, input: &str) -> Result<Url, Error> {
        Ok(self.options.scope.resolve(input)?)
    }

    /// Seed the current store with every asset.
    ///
    /// Every asset is fetched first; the batch is written in one transaction
    /// only if all of them returned 2xx. On failure nothing is written and the
    /// router becomes redundant (unless it is already serving, in which case
    /// the previous entries stay in place). Dropping the returned future
    /// counts as a failure.
    ///
    /// Returns the number of entries written.
    pub async fn seed(&self) -> Result<usize, Error> {
        let transition = self.lifecycle.begin(LifecycleEvent::InstallStarted, LifecycleEvent::InstallFailed)?;

        match self.seed_store().await {
            Ok(count) => {
                transition.finish(LifecycleEvent::InstallSucceeded)?;
                tracing::info!(version = %self.options.version, entries = count, "cache seeded");
                Ok(count)
            }
            Err(e) => {
                transition.finish(LifecycleEvent::InstallFailed)?;
                tracing::warn!(version = %self.options.version, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn seed_store(&self) -> Result<usize, Error> {
        let version = &self.options.version;
        self.storage.open_store(version).await?;

        let mut entries = Vec::with_capacity(self.options.assets.len());
        for url in &self.options.assets {
            let request = InterceptedRequest::get(url.clone());
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::SeedFailed { url: url.to_string(), reason: e.to_string() })?;

            if !response.is_success() {
                return Err(Error::SeedFailed { url: url.to_string(), reason: format!("status {}", response.status) });
            }

            tracing::debug!(url = %url, bytes = response.body.len(), "asset fetched");
            entries.push((request, response));
        }

        self.storage.put_all(version, &entries).await?;
        Ok(entries.len())
    }

    /// Delete every store whose name differs from the version tag.
    ///
    /// Returns the deleted names. Once this succeeds the router serves
    /// requests immediately.
    pub async fn reconcile(&self) -> Result<Vec<String>, Error> {
        let transition = self.lifecycle.begin(LifecycleEvent::ActivateStarted, LifecycleEvent::ActivateFailed)?;

        match self.purge_stale_stores().await {
            Ok(purged) => {
                transition.finish(LifecycleEvent::ActivateSucceeded)?;
                tracing::info!(version = %self.options.version, purged = ?purged, "activated");
                Ok(purged)
            }
            Err(e) => {
                transition.finish(LifecycleEvent::ActivateFailed)?;
                tracing::warn!(version = %self.options.version, error = %e, "activation failed");
                Err(e)
            }
        }
    }

    async fn purge_stale_stores(&self) -> Result<Vec<String>, Error> {
        let mut purged = Vec::new();
        for name in self.storage.store_names().await? {
            if name != self.options.version && self.storage.delete_store(&name).await? {
                purged.push(name);
            }
        }
        Ok(purged)
    }

    /// Seed, then activate straight away when `skip_waiting` is set.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let seeded = self.seed().await?;
        let purged = if self.options.skip_waiting { self.reconcile().await? } else { Vec::new() };

        Ok(InstallReport { version: self.options.version.clone(), seeded, state: self.state(), purged })
    }

    /// Answer one intercepted request.
    ///
    /// # Errors
    ///
    /// Storage failures, a missing shell document on the fallback path, and
    /// network errors under [`FallbackMode::Propagate`] are returned to the
    /// host, which should treat them as a network error for this request.
    pub async fn resolve(&self, request: &InterceptedRequest) -> Result<Resolution, Error> {
        if !self.lifecycle.is_active() {
            tracing::debug!(url = %request.url, "router inactive, passing through");
            let response = self.network.fetch(request).await?;
            return Ok(Resolution::new(response, ResponseSource::Passthrough));
        }

        match self.options.policy.classify(&self.options.scope, request) {
            RequestClass::Navigation => self.resolve_navigation(request).await,
            class => self.resolve_resource(request, class).await,
        }
    }

    async fn resolve_navigation(&self, request: &InterceptedRequest) -> Result<Resolution, Error> {
        if let Some(shell) = self.cached_shell().await? {
            tracing::debug!(url = %request.url, "navigation served from shell");
            return Ok(Resolution::new(shell, ResponseSource::Cache));
        }

        match self.network.fetch(request).await {
            Ok(response) => Ok(Resolution::new(response, ResponseSource::Network)),
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "navigation offline");
                Ok(Resolution::new(CapturedResponse::offline_page(), ResponseSource::OfflinePage))
            }
        }
    }

    async fn resolve_resource(&self, request: &InterceptedRequest, class: RequestClass) -> Result<Resolution, Error> {
        let version = &self.options.version;

        if let Some(cached) = self.storage.match_request(version, request).await? {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(Resolution::new(cached, ResponseSource::Cache));
        }
        tracing::debug!(url = %request.url, "cache miss");

        let outcome = self.network.fetch(request).await;
        let response = match outcome {
            Ok(response) if response.is_success() => response,
            failed => return self.fall_back(request, class, failed).await,
        };

        if request.is_get()
            && self.options.scope.is_same_origin(&request.url)
            && let Err(e) = self.storage.put(version, request, &response).await
        {
            tracing::warn!(url = %request.url, error = %e, "write-through failed");
        }

        Ok(Resolution::new(response, ResponseSource::Network))
    }

    async fn fall_back(
        &self, request: &InterceptedRequest, class: RequestClass, failed: Result<CapturedResponse, Error>,
    ) -> Result<Resolution, Error> {
        match self.options.policy.mode_for(class) {
            FallbackMode::Shell => {
                match &failed {
                    Ok(response) => tracing::warn!(url = %request.url, status = response.status, "serving shell fallback"),
                    Err(e) => tracing::warn!(url = %request.url, error = %e, "serving shell fallback"),
                }
                let shell = self
                    .cached_shell()
                    .await?
                    .ok_or_else(|| Error::ShellMissing(self.options.shell.to_string()))?;
                Ok(Resolution::new(shell, ResponseSource::ShellFallback))
            }
            FallbackMode::Propagate => failed.map(|response| Resolution::new(response, ResponseSource::Network)),
        }
    }

    async fn cached_shell(&self) -> Result<Option<CapturedResponse>, Error> {
        let shell = InterceptedRequest::get(self.options.shell.clone());
        self.storage.match_request(&self.options.version, &shell).await
    }

    /// Names of every store in storage.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.storage.store_names().await
    }

    /// Number of entries in the current store.
    pub async fn entry_count(&self) -> Result<u64, Error> {
        self.storage.entry_count(&self.options.version).await
    }

    /// Entries of the current store.
    pub async fn entries(&self) -> Result<Vec<CacheEntryMeta>, Error> {
        self.storage.list_entries(&self.options.version).await
    }

    /// Look up a GET for `url` in the current store without any fallback.
    pub async fn lookup(&self, url: &Url) -> Result<Option<CapturedResponse>, Error> {
        let request = InterceptedRequest::get(url.clone());
        self.storage.match_request(&self.options.version, &request).await
    }
}

#[cfg(test)]
mod tests;
