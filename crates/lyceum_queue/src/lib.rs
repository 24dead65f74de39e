//! Priority-ordered, concurrency-bounded job scheduling.
//!
//! A [`RequestQueue`] accepts arbitrary asynchronous work and runs at most
//! `concurrency` jobs at once. Pending jobs are ordered by descending
//! priority weight with FIFO order inside each priority; every job races its
//! body against a wall-clock timeout. Results are settled exactly once on a
//! per-job [`JobHandle`].
//!
//! The queue never retries: callers wanting retry wrap the job body with
//! a retry policy before enqueueing, so backoff delays count against the
//! job's own concurrency slot rather than stalling the queue.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod job;
mod queue;

pub use job::{JobHandle, JobOptions, JobPriority};
pub use queue::RequestQueue;
