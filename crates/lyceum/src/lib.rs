//! Lyceum - AI Request Orchestration Core
//!
//! Lyceum is the request orchestration layer of a content-serving education
//! platform: it accepts requests destined for external generative-model
//! providers, decides which model to use based on caller entitlement,
//! enforces concurrency and rate limits, retries transient failures with
//! backoff, and tracks per-caller daily quotas with expiration-driven
//! downgrade.
//!
//! # Components
//!
//! - **RateLimiter**: fixed-window counter bounding burst traffic per caller
//! - **RetryPolicy**: deterministic exponential backoff around provider calls
//! - **QuotaTracker**: tier-aware daily volume limits with calendar resets
//! - **TieredRouter**: entitlement-based model selection with base-tier fallback
//! - **RequestQueue**: priority-ordered, concurrency-bounded job scheduling
//!
//! The [`Orchestrator`] wires them together for the serving layer: a request
//! is admitted (rate limit, then quota), enqueued as a job whose body routes
//! to the entitled model under a retry policy, and settled on a per-job
//! handle.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lyceum::{
//!     GenerateOptions, LyceumConfig, MemoryQuotaStore, Message, OpenAiCompatClient,
//!     Orchestrator,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LyceumConfig::load()?;
//!     let provider = Arc::new(OpenAiCompatClient::from_env()?);
//!     let store = Arc::new(MemoryQuotaStore::new());
//!     let orchestrator = Orchestrator::new(&config, provider, store)?;
//!
//!     let completion = orchestrator
//!         .chat(
//!             "student-42",
//!             &[Message::user("Explain photosynthesis briefly.")],
//!             GenerateOptions::default(),
//!         )
//!         .await?;
//!     println!("{} (from {})", completion.text, completion.model_used);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Lyceum is organized as a workspace with focused crates:
//!
//! - `lyceum_core` - Core data types and configuration
//! - `lyceum_interface` - Provider and store trait definitions
//! - `lyceum_error` - Error types
//! - `lyceum_rate_limit` - Fixed-window limiting and retry backoff
//! - `lyceum_quota` - Daily quota tracking
//! - `lyceum_router` - Tier routing with base fallback
//! - `lyceum_queue` - Job scheduling
//! - `lyceum_models` - Provider adapters
//!
//! This crate (`lyceum`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod orchestrator;

pub use orchestrator::{Admission, Orchestrator};

pub use lyceum_core::{
    AccessTier, ChatRequest, ChatResponse, DenialReason, GenerateOptions, LyceumConfig, Message,
    ModelRoute, QuotaDecision, QueueSettings, RateLimitSettings, RateLimitSummary, RetrySettings,
    Role, TierQuota, TierSettings, init_telemetry,
};
pub use lyceum_error::{
    ConfigError, LyceumError, LyceumErrorKind, LyceumResult, ProviderError, ProviderErrorKind,
    QueueError, QueueErrorKind, QuotaError, QuotaErrorKind, RateLimitError, RateLimitErrorKind,
    RetryableError,
};
pub use lyceum_interface::{ChatProvider, QuotaStore};
pub use lyceum_models::OpenAiCompatClient;
pub use lyceum_queue::{JobHandle, JobOptions, JobPriority, RequestQueue};
pub use lyceum_quota::{MemoryQuotaStore, QuotaTracker};
pub use lyceum_rate_limit::{BackoffSchedule, RateLimiter, RetryPolicy};
pub use lyceum_router::{RoutedCompletion, RouteTable, TieredRouter};
