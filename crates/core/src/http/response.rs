//! Captured response model.

use bytes::Bytes;

/// Markup returned when a navigation misses the cache and the network is down.
pub const OFFLINE_PAGE_HTML: &str = "<h1>Offline</h1><p>Open app while online to cache.</p>";

/// A response as returned by the network or stored in a Cache Store.
///
/// The body is immutable [`Bytes`], so cloning hands out an independent
/// handle: caching a copy never consumes the one returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    pub status: u16,
    pub status_text: String,
    /// Header pairs in arrival order, names lower-cased.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CapturedResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: String::new(), headers: Vec::new(), body: body.into() }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// The constant offline page.
    pub fn offline_page() -> Self {
        Self::new(200, Bytes::from_static(OFFLINE_PAGE_HTML.as_bytes()))
            .with_status_text("OK")
            .with_header("content-type", "text/html")
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
