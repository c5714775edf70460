//! URL resolution against the router scope.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for crate::Error {
    fn from(err: UrlError) -> Self {
        crate::Error::InvalidUrl(err.to_string())
    }
}

/// The absolute location the router is mounted at.
///
/// Every relative URL (asset list entries, the shell path, fetch inputs) is
/// resolved against it, and its origin decides what counts as same-origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    base: Url,
}

impl Scope {
    /// Parse an absolute http(s) scope URL.
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }

        let base = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        check_scheme(&base)?;
        if base.cannot_be_a_base() {
            return Err(UrlError::InvalidUrl(format!("{trimmed} cannot be a base")));
        }

        Ok(Self { base })
    }

    /// The scope URL itself.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `input` against the scope.
    ///
    /// Absolute URLs are accepted as-is (they may be cross-origin). The
    /// fragment is removed, the query string is kept verbatim.
    pub fn resolve(&self, input: &str) -> Result<Url, UrlError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }

        let mut url = self.base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        check_scheme(&url)?;
        url.set_fragment(None);
        Ok(url)
    }

    /// Whether `url` shares the scope's origin (scheme, host and port).
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }

    /// Path of `url` relative to the scope path, when `url` lies inside the scope.
    pub fn relative_path<'a>(&self, url: &'a Url) -> Option<&'a str> {
        if !self.is_same_origin(url) {
            return None;
        }
        url.path().strip_prefix(self.base.path())
    }
}

fn check_scheme(url: &Url) -> Result<(), UrlError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}
