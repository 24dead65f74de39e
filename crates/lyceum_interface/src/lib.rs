//! Trait definitions for the lyceum request orchestration core.
//!
//! This crate holds the seams between the core and its external
//! collaborators: the model providers invoked by the tier router and the
//! persistent store backing the quota tracker.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ChatProvider, QuotaStore};
