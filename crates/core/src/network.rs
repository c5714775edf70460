//! Network seam used by the router.

use async_trait::async_trait;

use crate::Error;
use crate::http::{CapturedResponse, InterceptedRequest};

/// Performs a request against the real network.
///
/// Any HTTP status, including 4xx/5xx, is a successful return; only failures
/// to obtain a response at all (connection, DNS, TLS, timeout, oversize
/// body) are errors. No retries.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<CapturedResponse, Error>;
}
