//! SQLite-backed Cache Storage.
//!
//! Holds any number of named Cache Stores (one per version tag) in a single
//! database accessed via tokio-rusqlite. It supports:
//!
//! - Request-keyed entries (SHA-256 of method and URL)
//! - Atomic batch writes for all-or-nothing seeding
//! - Store deletion cascading to its entries
//! - Automatic schema migrations

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CacheEntryMeta;

use crate::http::{CapturedResponse, InterceptedRequest};
use async_trait::async_trait;

/// Storage service the router is handed at construction.
///
/// Implementations must make each call atomic per key; `put_all` must be
/// atomic as a whole.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if absent.
    async fn open_store(&self, name: &str) -> Result<(), Error>;

    /// Names of every existing store.
    async fn store_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a store with all its entries. Returns whether it existed.
    async fn delete_store(&self, name: &str) -> Result<bool, Error>;

    /// Look up a request in a store.
    async fn match_request(
        &self, store: &str, request: &InterceptedRequest,
    ) -> Result<Option<CapturedResponse>, Error>;

    /// Write one entry.
    async fn put(&self, store: &str, request: &InterceptedRequest, response: &CapturedResponse) -> Result<(), Error>;

    /// Write a batch of entries, all or none.
    async fn put_all(&self, store: &str, entries: &[(InterceptedRequest, CapturedResponse)]) -> Result<(), Error>;

    async fn entry_count(&self, store: &str) -> Result<u64, Error>;

    async fn list_entries(&self, store: &str) -> Result<Vec<CacheEntryMeta>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open_store(&self, name: &str) -> Result<(), Error> {
        CacheDb::open_store(self, name).await
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        CacheDb::store_names(self).await
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        CacheDb::delete_store(self, name).await
    }

    async fn match_request(
        &self, store: &str, request: &InterceptedRequest,
    ) -> Result<Option<CapturedResponse>, Error> {
        CacheDb::match_request(self, store, request).await
    }

    async fn put(&self, store: &str, request: &InterceptedRequest, response: &CapturedResponse) -> Result<(), Error> {
        CacheDb::put(self, store, request, response).await
    }

    async fn put_all(&self, store: &str, entries: &[(InterceptedRequest, CapturedResponse)]) -> Result<(), Error> {
        CacheDb::put_all(self, store, entries).await
    }

    async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        CacheDb::entry_count(self, store).await
    }

    async fn list_entries(&self, store: &str) -> Result<Vec<CacheEntryMeta>, Error> {
        CacheDb::list_entries(self, store).await
    }
}
