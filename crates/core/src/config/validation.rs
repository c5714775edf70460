//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version` is empty
    /// - `scope` is not an absolute http(s) URL
    /// - `assets` is empty or an entry does not resolve against the scope
    /// - `shell_path` does not resolve or is not one of the assets
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(invalid("version", "must not be empty"));
        }

        let scope = self.scope()?;

        if self.assets.is_empty() {
            return Err(invalid("assets", "must list at least the shell document"));
        }
        let mut resolved = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            let url = scope
                .resolve(asset)
                .map_err(|e| invalid("assets", format!("{asset}: {e}")))?;
            resolved.push(url);
        }

        let shell = scope
            .resolve(&self.shell_path)
            .map_err(|e| invalid("shell_path", e.to_string()))?;
        if !resolved.contains(&shell) {
            return Err(invalid("shell_path", format!("{shell} is not in the asset list")));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if resolved.iter().any(|url| !scope.is_same_origin(url)) {
            tracing::warn!(
                scope = %scope.base(),
                "asset list contains cross-origin URLs; they are seeded but never written through on fetch"
            );
        }

        Ok(())
    }
}
