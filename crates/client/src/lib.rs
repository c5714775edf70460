//! Network client for shellcache.
//!
//! This crate provides the reqwest-backed implementation of the router's
//! `Network` seam, shared by the server and any other host adapter.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
