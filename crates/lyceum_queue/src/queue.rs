//! Concurrency-bounded dispatch over a priority-ordered pending list.

use crate::job::{Job, JobHandle, JobOptions};
use futures::future::BoxFuture;
use lyceum_error::{LyceumResult, QueueError, QueueErrorKind};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct QueueState<T> {
    /// Jobs not yet dispatched, ordered by descending priority weight, then
    /// arrival order within equal priority.
    pending: Vec<Job<T>>,
    /// Jobs currently executing; never exceeds the configured concurrency.
    active: usize,
}

struct QueueInner<T> {
    state: Mutex<QueueState<T>>,
    concurrency: usize,
}

/// Priority-ordered, concurrency-bounded job scheduler.
///
/// One instance exists per orchestration core, constructed at startup and
/// passed by reference to callers. Cloning is cheap; clones share the same
/// queue.
///
/// # Examples
///
/// ```
/// use lyceum_queue::{JobOptions, RequestQueue};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue: RequestQueue<u32> = RequestQueue::new(2);
/// let handle = queue.enqueue(|| async { Ok(41 + 1) }, JobOptions::default());
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub struct RequestQueue<T> {
    inner: Arc<QueueInner<T>>,
}

impl<T> Clone for RequestQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> RequestQueue<T> {
    /// Create a queue running at most `concurrency` jobs at once.
    ///
    /// The capacity is fixed for the queue's lifetime. A capacity of zero is
    /// treated as one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    pending: Vec::new(),
                    active: 0,
                }),
                concurrency: concurrency.max(1),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue a unit of work and return its pending result handle.
    ///
    /// The job is inserted keeping the ordering invariant (stable sort by
    /// priority weight descending) and dispatched as soon as a concurrency
    /// slot frees up. Failures surface on the handle; the queue itself never
    /// retries.
    pub fn enqueue<F, Fut>(&self, execute: F, options: JobOptions) -> JobHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = LyceumResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let id = Uuid::new_v4().to_string();
        let job = Job {
            id: id.clone(),
            body: Box::new(move || -> BoxFuture<'static, LyceumResult<T>> { Box::pin(execute()) }),
            priority: options.priority,
            timeout: options.timeout,
            metadata: options.metadata,
            tx,
        };

        {
            let mut state = self.lock();
            // First position with strictly lower weight keeps equal-priority
            // jobs in arrival order.
            let position = state
                .pending
                .iter()
                .position(|queued| queued.priority.weight() < job.priority.weight())
                .unwrap_or(state.pending.len());
            debug!(
                job_id = %job.id,
                priority = %job.priority,
                position,
                queued = state.pending.len(),
                metadata = ?job.metadata,
                "Enqueued job"
            );
            state.pending.insert(position, job);
        }

        self.dispatch();
        JobHandle::new(id, rx)
    }

    /// Reject every job still pending with a cancellation error.
    ///
    /// Jobs already dispatched are not affected; there is no mid-flight
    /// cancellation.
    pub fn cancel_all(&self) {
        let drained: Vec<Job<T>> = {
            let mut state = self.lock();
            state.pending.drain(..).collect()
        };
        if drained.is_empty() {
            return;
        }
        info!(cancelled = drained.len(), "Cancelling pending jobs");
        for job in drained {
            let _ = job
                .tx
                .send(Err(QueueError::new(QueueErrorKind::Cancelled).into()));
        }
    }

    /// Number of jobs waiting for dispatch (excludes executing jobs).
    /// Observability only.
    pub fn queue_size(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of jobs currently executing. Observability only.
    pub fn active_count(&self) -> usize {
        self.lock().active
    }

    /// The fixed concurrency capacity.
    pub fn concurrency(&self) -> usize {
        self.inner.concurrency
    }

    /// Synchronously start as many pending jobs as free slots allow.
    ///
    /// Called after every enqueue and every settlement; never blocks.
    fn dispatch(&self) {
        loop {
            let job = {
                let mut state = self.lock();
                if state.active >= self.inner.concurrency || state.pending.is_empty() {
                    return;
                }
                state.active += 1;
                state.pending.remove(0)
            };

            let queue = self.clone();
            tokio::spawn(async move {
                queue.run_job(job).await;
            });
        }
    }

    /// Race one job's body against its timeout and settle its handle.
    async fn run_job(&self, job: Job<T>) {
        let Job {
            id,
            body,
            timeout,
            metadata,
            tx,
            ..
        } = job;
        debug!(job_id = %id, metadata = ?metadata, "Dispatching job");

        // The body runs in its own task so a timeout abandons the job
        // without cancelling the in-flight call; a late result is discarded
        // when the detached task finishes.
        let running = tokio::spawn((body)());
        let outcome = match tokio::time::timeout(timeout, running).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                warn!(job_id = %id, error = %join_error, "Job task failed");
                Err(QueueError::new(QueueErrorKind::Panicked(join_error.to_string())).into())
            }
            Err(_elapsed) => {
                let timeout_ms = timeout.as_millis() as u64;
                warn!(job_id = %id, timeout_ms, "Job timed out");
                Err(QueueError::new(QueueErrorKind::Timeout { timeout_ms }).into())
            }
        };

        // The caller may have dropped its handle; settlement still proceeds.
        let _ = tx.send(outcome);

        {
            let mut state = self.lock();
            state.active -= 1;
        }
        // A freed slot re-dispatches regardless of how the job ended.
        self.dispatch();
    }
}
