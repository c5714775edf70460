//! Recording network double for router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::Error;
use crate::cache::{CacheDb, CacheEntryMeta, CacheStorage};
use crate::http::{CapturedResponse, InterceptedRequest};
use crate::network::Network;

#[derive(Clone)]
enum Reply {
    Respond(CapturedResponse),
    Fail,
    /// Never answers.
    Hang,
}

/// Answers from a URL table; unknown URLs fail like a dropped connection.
#[derive(Default)]
pub(crate) struct MockNetwork {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, response: CapturedResponse) {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Respond(response));
    }

    pub(crate) fn fail(&self, url: &str) {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Fail);
    }

    pub(crate) fn hang(&self, url: &str) {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Hang);
    }

    /// Drop every configured reply: all requests now fail.
    pub(crate) fn go_offline(&self) {
        self.replies.lock().unwrap().clear();
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<CapturedResponse, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        let reply = self.replies.lock().unwrap().get(&url).cloned();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Fail) | None => Err(Error::Network(format!("connection refused: {url}"))),
        }
    }
}

/// Storage that reads and seeds normally but fails every single-entry write.
pub(crate) struct RejectingPuts(pub(crate) CacheDb);

#[async_trait]
impl CacheStorage for RejectingPuts {
    async fn open_store(&self, name: &str) -> Result<(), Error> {
        self.0.open_store(name).await
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.0.store_names().await
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        self.0.delete_store(name).await
    }

    async fn match_request(
        &self, store: &str, request: &InterceptedRequest,
    ) -> Result<Option<CapturedResponse>, Error> {
        self.0.match_request(store, request).await
    }

    async fn put(&self, _store: &str, request: &InterceptedRequest, _response: &CapturedResponse) -> Result<(), Error> {
        Err(Error::CorruptEntry(format!("disk full writing {}", request.url)))
    }

    async fn put_all(&self, store: &str, entries: &[(InterceptedRequest, CapturedResponse)]) -> Result<(), Error> {
        self.0.put_all(store, entries).await
    }

    async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        self.0.entry_count(store).await
    }

    async fn list_entries(&self, store: &str) -> Result<Vec<CacheEntryMeta>, Error> {
        self.0.list_entries(store).await
    }
}

pub(crate) fn html(body: &str) -> CapturedResponse {
    CapturedResponse::new(200, body.to_string())
        .with_status_text("OK")
        .with_header("content-type", "text/html")
}

pub(crate) fn json(status: u16, body: &str) -> CapturedResponse {
    CapturedResponse::new(status, body.to_string()).with_header("content-type", "application/json")
}
