//! Cache inspection tools.
//!
//! Read-only views of the Cache Storage behind the router.

pub mod get;
pub mod stores;

pub use get::{CacheGetParams, get_impl};
pub use stores::stores_impl;
