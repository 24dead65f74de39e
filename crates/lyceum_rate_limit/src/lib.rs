//! Rate limiting and retry backoff for the lyceum orchestration core.
//!
//! This crate provides two independent admission primitives:
//!
//! - [`RateLimiter`] — a fixed-window counter keyed by arbitrary identifier,
//!   used by the serving layer to bound burst traffic per caller.
//! - [`RetryPolicy`] — a deterministic exponential-backoff executor wrapping
//!   any asynchronous operation, used by callers to retry transient provider
//!   failures before a job occupies a queue slot.
//!
//! Rate limiting and daily quota tracking are complementary checks: the
//! window bounds bursts, the quota bounds daily volume.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod limiter;
mod retry;

pub use limiter::{RateLimitEntry, RateLimiter};
pub use retry::{BackoffSchedule, RetryPolicy};
