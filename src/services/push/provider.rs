//! Core push provider trait.
//!
//! This module provides the abstraction for push gateway providers,
//! allowing easy extension to support further gateways.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{DispatchRequest, PushResponse};

/// Trait for push gateway providers (GCM, APNs, BlackBerry PAP)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// All providers must be Send + Sync for use in async contexts.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Dispatches the request's message to every endpoint it names.
    ///
    /// The returned response answers `status()` for each of those endpoints
    /// (worst case `Unknown`). Gateway failures are classified into the
    /// response rather than surfaced as errors; `Err` is reserved for
    /// dispatch-level misuse (provider not configured for use).
    async fn push(&self, request: &DispatchRequest) -> AppResult<PushResponse>;

    /// Returns the provider name for logging/debugging
    fn name(&self) -> &'static str;
}
