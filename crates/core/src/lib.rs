//! Core types and routing policy for shellcache.
//!
//! This crate provides:
//! - Request/response model and scope-relative URL resolution
//! - Cache Storage with SQLite backend
//! - The Request Router (seed, reconcile, resolve) and its lifecycle
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod network;
pub mod router;

pub use cache::{CacheDb, CacheEntryMeta, CacheStorage};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{CapturedResponse, InterceptedRequest, RequestMode, Scope};
pub use network::Network;
pub use router::{FallbackMode, InstallReport, LifecycleState, Resolution, ResponseSource, Router, RouterOptions};
