//! Router configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The version tag must be bumped whenever the asset list or the shell
//! document changes; that is what invalidates older stores on activation.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

use crate::http::Scope;
use crate::router::FallbackMode;

/// Router configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELLCACHE_*)
/// 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version tag; also the name of the current Cache Store.
    ///
    /// Set via SHELLCACHE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Absolute URL the router is mounted at.
    ///
    /// Set via SHELLCACHE_SCOPE environment variable.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Relative URLs fetched and stored on install, in order.
    ///
    /// Set via SHELLCACHE_ASSETS environment variable (e.g. `["./", "./index.html"]`).
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Shell document: seeded on install, served for navigations and fallbacks.
    ///
    /// Set via SHELLCACHE_SHELL_PATH environment variable.
    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    /// Path to SQLite cache database.
    ///
    /// Set via SHELLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    ///
    /// Set via SHELLCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network request timeout in milliseconds.
    ///
    /// Set via SHELLCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to read per network response.
    ///
    /// Set via SHELLCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Activate right after a successful install.
    ///
    /// Set via SHELLCACHE_SKIP_WAITING environment variable.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Run install (and activation, with skip_waiting) when the server boots.
    ///
    /// Set via SHELLCACHE_INSTALL_ON_START environment variable.
    #[serde(default = "default_true")]
    pub install_on_start: bool,

    /// Scope-relative path prefixes treated as API requests (e.g. `api/`).
    ///
    /// Set via SHELLCACHE_API_PREFIXES environment variable.
    #[serde(default)]
    pub api_prefixes: Vec<String>,

    /// What an API request gets when the network fails.
    ///
    /// Set via SHELLCACHE_API_FALLBACK environment variable (`shell` or `propagate`).
    #[serde(default)]
    pub api_fallback: FallbackMode,

    /// What any other resource request gets when the network fails.
    ///
    /// Set via SHELLCACHE_ASSET_FALLBACK environment variable (`shell` or `propagate`).
    #[serde(default)]
    pub asset_fallback: FallbackMode,
}

fn default_version() -> String {
    "shell-v1".into()
}

fn default_scope() -> String {
    "http://localhost:8080/".into()
}

fn default_assets() -> Vec<String> {
    vec!["./".into(), "./index.html".into()]
}

fn default_shell_path() -> String {
    "./index.html".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            scope: default_scope(),
            assets: default_assets(),
            shell_path: default_shell_path(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            skip_waiting: true,
            install_on_start: true,
            api_prefixes: Vec::new(),
            api_fallback: FallbackMode::default(),
            asset_fallback: FallbackMode::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed scope URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `scope` is not an absolute http(s) URL.
    pub fn scope(&self) -> Result<Scope, ConfigError> {
        Scope::parse(&self.scope).map_err(|e| ConfigError::Invalid { field: "scope".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHELLCACHE_`
    /// 2. TOML file from `SHELLCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELLCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
