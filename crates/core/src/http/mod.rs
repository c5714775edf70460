//! Request and response types shared by the router, the cache and the
//! network layer.
//!
//! ### Request identity
//! - Relative URLs resolve against the configured [`Scope`].
//! - Fragments are dropped, the query string is kept.
//! - Only GET requests are ever stored or matched.

pub mod request;
pub mod response;
pub mod url;

pub use request::{InterceptedRequest, RequestMode};
pub use response::{CapturedResponse, OFFLINE_PAGE_HTML};
pub use url::{Scope, UrlError};
