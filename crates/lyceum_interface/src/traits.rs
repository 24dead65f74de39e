//! Trait seams for providers and quota persistence.

use async_trait::async_trait;
use lyceum_core::{ChatRequest, ChatResponse, TierQuota};
use lyceum_error::LyceumResult;

/// Core trait every model provider adapter must implement.
///
/// The router treats providers as opaque asynchronous calls: a resolved
/// request goes in, generated text or an error comes out. Errors are not
/// distinguished beyond succeeded/failed at this seam; retry classification
/// happens on the error type itself.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate a completion for a resolved request.
    async fn chat(&self, request: &ChatRequest) -> LyceumResult<ChatResponse>;

    /// Provider name (e.g., "openai", "anthropic").
    fn provider_name(&self) -> &'static str;
}

/// Caller-keyed persistence for daily quota records.
///
/// Reads return `None` for unknown callers. The store is the only resource
/// shared across process instances; concurrent instances may race on
/// increments, which is acceptable slack rather than a correctness
/// requirement of this core.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Load the quota record for a caller, if one exists.
    async fn load(&self, caller: &str) -> LyceumResult<Option<TierQuota>>;

    /// Persist the quota record for a caller.
    async fn save(&self, caller: &str, quota: &TierQuota) -> LyceumResult<()>;
}
