//! Intercepted request model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Request mode as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

impl RequestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Navigate => "navigate",
            RequestMode::SameOrigin => "same-origin",
            RequestMode::NoCors => "no-cors",
            RequestMode::Cors => "cors",
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "navigate" => Ok(RequestMode::Navigate),
            "same-origin" => Ok(RequestMode::SameOrigin),
            "no-cors" => Ok(RequestMode::NoCors),
            "cors" => Ok(RequestMode::Cors),
            other => Err(Error::InvalidInput(format!("unsupported request mode: {other}"))),
        }
    }
}

/// One outgoing request seen by the router. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Absolute URL, fragment removed.
    pub url: Url,
    pub mode: RequestMode,
    /// Value of the `Accept` header, if any.
    pub accept: Option<String>,
}

impl InterceptedRequest {
    /// A plain GET in `cors` mode with no accept hint.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::default(), accept: None }
    }

    /// A top-level document load.
    pub fn navigate(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::Navigate, accept: Some("text/html".into()) }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.trim().to_ascii_uppercase();
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Whether the accept hint mentions `mime` (substring match, like the host does).
    pub fn accepts(&self, mime: &str) -> bool {
        self.accept.as_deref().is_some_and(|a| a.contains(mime))
    }

    /// Navigation-like: navigate mode, or a GET preferring HTML.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate || (self.is_get() && self.accepts("text/html"))
    }
}
