//! Job types for the request queue.

use futures::future::BoxFuture;
use lyceum_error::{LyceumResult, QueueError, QueueErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

/// Scheduling priority of a queued job.
///
/// Higher priorities dispatch first; jobs of equal priority dispatch in
/// enqueue order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobPriority {
    /// Background work, dispatched last
    Low,
    /// Default priority
    #[default]
    Normal,
    /// Interactive work, dispatched first
    High,
}

impl JobPriority {
    /// Ordering weight: high=3, normal=2, low=1.
    pub fn weight(&self) -> u8 {
        match self {
            JobPriority::Low => 1,
            JobPriority::Normal => 2,
            JobPriority::High => 3,
        }
    }
}

/// Options for one enqueued job.
///
/// # Examples
///
/// ```
/// use lyceum_queue::{JobOptions, JobPriority};
/// use std::time::Duration;
///
/// let options = JobOptions::default()
///     .with_priority(JobPriority::High)
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(options.priority, JobPriority::High);
/// ```
#[derive(Debug, Clone, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct JobOptions {
    /// Scheduling priority
    pub priority: JobPriority,
    /// Wall-clock deadline before the job is abandoned
    pub timeout: Duration,
    /// Opaque diagnostics bag, surfaced only in logs
    pub metadata: HashMap<String, String>,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            priority: JobPriority::default(),
            timeout: Duration::from_millis(60_000),
            metadata: HashMap::new(),
        }
    }
}

/// Type-erased job body: a one-shot closure producing the job's future.
pub(crate) type JobBody<T> = Box<dyn FnOnce() -> BoxFuture<'static, LyceumResult<T>> + Send>;

/// A unit of queued work, owned exclusively by the queue until dispatched.
pub(crate) struct Job<T> {
    pub id: String,
    pub body: JobBody<T>,
    pub priority: JobPriority,
    pub timeout: Duration,
    pub metadata: HashMap<String, String>,
    pub tx: oneshot::Sender<LyceumResult<T>>,
}

/// Caller-visible handle settled exactly once when the job finishes, times
/// out, or is cancelled.
///
/// Awaiting the handle yields the job's result. Dropping the handle does not
/// cancel the job.
#[derive(Debug)]
pub struct JobHandle<T> {
    id: String,
    rx: oneshot::Receiver<LyceumResult<T>>,
}

impl<T> JobHandle<T> {
    pub(crate) fn new(id: String, rx: oneshot::Receiver<LyceumResult<T>>) -> Self {
        Self { id, rx }
    }

    /// The job's unique id, assigned at enqueue time.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<T> Future for JobHandle<T> {
    type Output = LyceumResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            // The sender side only disappears without settling if the queue
            // itself was dropped with the job still pending.
            Err(_) => Err(QueueError::new(QueueErrorKind::Cancelled).into()),
        })
    }
}
