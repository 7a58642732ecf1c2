//! Remote context cache services
//!
//! The staleness engine never talks to a cache service itself. Commands use a
//! [`ContextCache`] to create and terminate caches, then record the result in
//! the registry.

pub mod gemini;

pub use gemini::GeminiCache;

use crate::error::ZaniResult;
use async_trait::async_trait;

/// Create/terminate capability of a remote context cache service
#[async_trait]
pub trait ContextCache: Send + Sync {
    /// Upload `context` as a new cache living `ttl_hours`, returning its identifier
    async fn create(&self, context: &str, ttl_hours: u32) -> ZaniResult<String>;

    /// Delete the cache; `Ok(false)` if the service no longer knows it
    async fn terminate(&self, cache_id: &str) -> ZaniResult<bool>;

    /// Human-readable service name for display
    fn service_name(&self) -> &'static str;
}
