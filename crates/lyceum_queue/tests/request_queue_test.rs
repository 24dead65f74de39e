//! Tests for priority dispatch, concurrency bounds, timeouts, and cancellation.

use lyceum_error::{ProviderError, ProviderErrorKind};
use lyceum_queue::{JobOptions, JobPriority, RequestQueue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn sleeping_job(
    label: &'static str,
    duration: Duration,
    log: Arc<Mutex<Vec<&'static str>>>,
) -> impl FnOnce() -> std::pin::Pin<Box<dyn std::future::Future<Output = lyceum_error::LyceumResult<&'static str>> + Send>>
{
    move || {
        Box::pin(async move {
            log.lock().unwrap().push(label);
            tokio::time::sleep(duration).await;
            Ok(label)
        })
    }
}

#[tokio::test(start_paused = true)]
async fn active_count_never_exceeds_concurrency() {
    let queue: RequestQueue<()> = RequestQueue::new(2);
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let current = current.clone();
            let peak = peak.clone();
            queue.enqueue(
                move || async move {
                    let running = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(running, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                },
                JobOptions::default(),
            )
        })
        .collect();

    assert!(queue.active_count() <= 2);
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 2);
    assert_eq!(queue.active_count(), 0);
    assert_eq!(queue.queue_size(), 0);
}

#[tokio::test(start_paused = true)]
async fn high_priority_overtakes_earlier_normal_job() {
    let queue: RequestQueue<&'static str> = RequestQueue::new(1);
    let log = Arc::new(Mutex::new(Vec::new()));

    // Occupy the single slot so subsequent jobs stay pending.
    let blocker = queue.enqueue(
        sleeping_job("blocker", Duration::from_millis(50), log.clone()),
        JobOptions::default(),
    );
    let normal = queue.enqueue(
        sleeping_job("normal", Duration::from_millis(10), log.clone()),
        JobOptions::default(),
    );
    let high = queue.enqueue(
        sleeping_job("high", Duration::from_millis(10), log.clone()),
        JobOptions::default().with_priority(JobPriority::High),
    );

    blocker.await.unwrap();
    high.await.unwrap();
    normal.await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["blocker", "high", "normal"]);
}

#[tokio::test(start_paused = true)]
async fn equal_priority_dispatches_in_enqueue_order() {
    let queue: RequestQueue<&'static str> = RequestQueue::new(1);
    let log = Arc::new(Mutex::new(Vec::new()));

    let blocker = queue.enqueue(
        sleeping_job("blocker", Duration::from_millis(50), log.clone()),
        JobOptions::default(),
    );
    let first = queue.enqueue(
        sleeping_job("first", Duration::from_millis(10), log.clone()),
        JobOptions::default().with_priority(JobPriority::Low),
    );
    let second = queue.enqueue(
        sleeping_job("second", Duration::from_millis(10), log.clone()),
        JobOptions::default().with_priority(JobPriority::Low),
    );

    blocker.await.unwrap();
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["blocker", "first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn timed_out_job_frees_its_slot() {
    let queue: RequestQueue<&'static str> = RequestQueue::new(1);
    let started = tokio::time::Instant::now();

    // A body that never settles; only the timeout bounds it.
    let stuck = queue.enqueue(
        || async {
            std::future::pending::<()>().await;
            Ok("unreachable")
        },
        JobOptions::default().with_timeout(Duration::from_millis(100)),
    );
    let next = queue.enqueue(|| async { Ok("ran") }, JobOptions::default());

    let error = stuck.await.unwrap_err();
    assert!(error.is_timeout(), "expected timeout, got {error}");
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(200), "elapsed {elapsed:?}");

    // The freed slot dispatches the next job.
    assert_eq!(next.await.unwrap(), "ran");
}

#[tokio::test(start_paused = true)]
async fn failed_job_does_not_block_the_queue() {
    let queue: RequestQueue<&'static str> = RequestQueue::new(1);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let failing = queue.enqueue(
        move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::new(ProviderErrorKind::Api {
                    status: 500,
                    message: "upstream exploded".to_string(),
                })
                .into())
            }
        },
        JobOptions::default(),
    );
    let next = queue.enqueue(|| async { Ok("ran") }, JobOptions::default());

    let error = failing.await.unwrap_err();
    assert!(format!("{error}").contains("upstream exploded"));
    // The queue reports the failure without retrying.
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(next.await.unwrap(), "ran");
}

#[tokio::test(start_paused = true)]
async fn cancel_all_rejects_pending_but_not_in_flight() {
    let queue: RequestQueue<&'static str> = RequestQueue::new(1);
    let log = Arc::new(Mutex::new(Vec::new()));

    let in_flight = queue.enqueue(
        sleeping_job("in-flight", Duration::from_millis(100), log.clone()),
        JobOptions::default(),
    );
    // Give the dispatch task a chance to start the first job.
    tokio::task::yield_now().await;
    assert_eq!(queue.active_count(), 1);

    let pending_one = queue.enqueue(
        sleeping_job("pending-1", Duration::from_millis(10), log.clone()),
        JobOptions::default(),
    );
    let pending_two = queue.enqueue(
        sleeping_job("pending-2", Duration::from_millis(10), log.clone()),
        JobOptions::default().with_priority(JobPriority::High),
    );
    assert_eq!(queue.queue_size(), 2);

    queue.cancel_all();
    assert_eq!(queue.queue_size(), 0);
    assert_eq!(queue.active_count(), 1);

    let error_one = pending_one.await.unwrap_err();
    let error_two = pending_two.await.unwrap_err();
    assert!(error_one.is_cancelled());
    assert!(error_two.is_cancelled());

    // The dispatched job runs to completion untouched.
    assert_eq!(in_flight.await.unwrap(), "in-flight");
    assert_eq!(*log.lock().unwrap(), vec!["in-flight"]);

    // The queue stays usable after a cancellation.
    let after = queue.enqueue(|| async { Ok("after") }, JobOptions::default());
    assert_eq!(after.await.unwrap(), "after");
}

#[tokio::test(start_paused = true)]
async fn queue_size_excludes_active_jobs() {
    let queue: RequestQueue<&'static str> = RequestQueue::new(1);
    let log = Arc::new(Mutex::new(Vec::new()));

    let blocker = queue.enqueue(
        sleeping_job("blocker", Duration::from_millis(50), log.clone()),
        JobOptions::default(),
    );
    tokio::task::yield_now().await;

    let waiting: Vec<_> = (0..3)
        .map(|_| queue.enqueue(|| async { Ok("queued") }, JobOptions::default()))
        .collect();

    assert_eq!(queue.queue_size(), 3);
    assert_eq!(queue.active_count(), 1);

    blocker.await.unwrap();
    for handle in waiting {
        handle.await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn job_ids_are_unique_and_metadata_is_opaque() {
    let queue: RequestQueue<&'static str> = RequestQueue::new(2);
    let metadata = HashMap::from([("caller".to_string(), "alice".to_string())]);

    let one = queue.enqueue(
        || async { Ok("one") },
        JobOptions::default().with_metadata(metadata.clone()),
    );
    let two = queue.enqueue(|| async { Ok("two") }, JobOptions::default());

    assert_ne!(one.id(), two.id());
    assert_eq!(one.await.unwrap(), "one");
    assert_eq!(two.await.unwrap(), "two");
}
