//! Shared fixtures for tool tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use shellcache_core::{AppConfig, CacheDb, CapturedResponse, Error, InterceptedRequest, Network, Router, RouterOptions};

/// Fixed URL table; everything else fails like an unreachable host.
pub(crate) struct StubNetwork {
    pages: HashMap<String, CapturedResponse>,
}

impl StubNetwork {
    pub(crate) fn app() -> Self {
        let mut pages = HashMap::new();
        for (url, body) in [("https://app.test/", "<main>root</main>"), ("https://app.test/index.html", "<main>shell</main>")] {
            pages.insert(
                url.to_string(),
                CapturedResponse::new(200, body.to_string()).with_header("content-type", "text/html"),
            );
        }
        pages.insert(
            "https://app.test/app.js".to_string(),
            CapturedResponse::new(200, "console.log(1)").with_header("content-type", "text/javascript"),
        );
        Self { pages }
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<CapturedResponse, Error> {
        self.pages
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("unreachable: {}", request.url)))
    }
}

pub(crate) fn test_config() -> AppConfig {
    AppConfig { version: "app-v1".into(), scope: "https://app.test/".into(), ..Default::default() }
}

/// Router over an in-memory store; installed and activated when `install` is set.
pub(crate) async fn router(install: bool) -> Arc<Router> {
    let options = RouterOptions::from_config(&test_config()).unwrap();
    let db = CacheDb::open_in_memory().await.unwrap();
    let router = Router::new(options, Arc::new(db), Arc::new(StubNetwork::app()));
    if install {
        router.install().await.unwrap();
    }
    Arc::new(router)
}

/// Parse the JSON text content of a tool result.
pub(crate) fn output<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
