//! Error types for the lyceum request orchestration core.
//!
//! This crate provides the foundation error types used throughout the lyceum
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use lyceum_error::{LyceumResult, ConfigError};
//!
//! fn load_settings() -> LyceumResult<String> {
//!     Err(ConfigError::new("missing [tiers] table"))?
//! }
//!
//! match load_settings() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod provider;
mod queue;
mod quota;
mod rate_limit;

pub use config::ConfigError;
pub use error::{LyceumError, LyceumErrorKind, LyceumResult};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use queue::{QueueError, QueueErrorKind};
pub use quota::{QuotaError, QuotaErrorKind};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
