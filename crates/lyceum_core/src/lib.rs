//! Core data types for the lyceum request orchestration core.
//!
//! This crate provides the foundation data types shared by the rate limiter,
//! quota tracker, tier router, and request queue.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod message;
mod quota;
mod request;
mod role;
mod route;
mod summary;
mod telemetry;
mod tier;

pub use config::{
    LyceumConfig, QueueSettings, RateLimitSettings, RetrySettings, TierSettings,
};
pub use message::Message;
pub use quota::{DenialReason, QuotaDecision, TierQuota};
pub use request::{ChatRequest, ChatResponse, GenerateOptions};
pub use role::Role;
pub use route::ModelRoute;
pub use summary::RateLimitSummary;
pub use telemetry::init_telemetry;
pub use tier::AccessTier;
