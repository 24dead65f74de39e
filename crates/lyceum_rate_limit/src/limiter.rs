//! Fixed-window rate limiter keyed by caller identifier.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Counter state for one `(bucket, identifier)` pair.
///
/// An entry whose `reset_at` has passed is logically dead; lookups treat it
/// as absent and recreate it on the next check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests observed in the current window
    pub count: u32,
    /// When the window closes and the count resets
    pub reset_at: Instant,
}

impl RateLimitEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }
}

/// Fixed-window rate limiter.
///
/// Counts requests per identifier in discrete, non-overlapping windows that
/// reset completely at the window boundary. The limiter is bucket-agnostic:
/// callers namespace identifiers by logical bucket (e.g. `"chat:<caller>"`)
/// so independent quotas do not collide.
///
/// Expired entries are removed lazily on lookup; [`RateLimiter::sweep`] (or
/// the task from [`RateLimiter::spawn_sweeper`]) bounds memory but is never
/// required for correctness.
///
/// # Examples
///
/// ```
/// use lyceum_rate_limit::RateLimiter;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new();
/// let window = Duration::from_secs(60);
///
/// assert!(limiter.check("chat:alice", 2, window));
/// assert!(limiter.check("chat:alice", 2, window));
/// assert!(!limiter.check("chat:alice", 2, window));
/// assert_eq!(limiter.get_remaining("chat:alice", 2), 0);
/// ```
#[derive(Debug, Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    /// Create an empty limiter.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a request against `identifier` and report whether it is allowed.
    ///
    /// If no live entry exists, a new window opens with `count = 1` and the
    /// request is allowed. At `count >= limit` the request is denied without
    /// mutating state; otherwise the count increments and the request is
    /// allowed.
    #[instrument(skip(self, window))]
    pub fn check(&self, identifier: &str, limit: u32, window: Duration) -> bool {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get_mut(identifier) {
            Some(entry) if !entry.is_expired(now) => {
                if entry.count >= limit {
                    debug!(count = entry.count, limit, "Request denied");
                    false
                } else {
                    entry.count += 1;
                    debug!(count = entry.count, limit, "Request allowed");
                    true
                }
            }
            _ => {
                // Absent or expired: open a fresh window.
                entries.insert(
                    identifier.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                debug!(limit, "Opened new window");
                true
            }
        }
    }

    /// Requests remaining for `identifier` in the current window.
    ///
    /// Returns the full limit when no live entry exists.
    pub fn get_remaining(&self, identifier: &str, limit: u32) -> u32 {
        let now = Instant::now();
        let entries = self.lock();
        match entries.get(identifier) {
            Some(entry) if !entry.is_expired(now) => limit.saturating_sub(entry.count),
            _ => limit,
        }
    }

    /// When the current window for `identifier` closes.
    ///
    /// Returns `None` when no live entry exists.
    pub fn get_reset_time(&self, identifier: &str) -> Option<Instant> {
        let now = Instant::now();
        let entries = self.lock();
        entries
            .get(identifier)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.reset_at)
    }

    /// Forget the current window for `identifier`.
    pub fn reset(&self, identifier: &str) {
        let mut entries = self.lock();
        entries.remove(identifier);
    }

    /// Physically remove expired entries, returning how many were dropped.
    ///
    /// Correctness never depends on this running; lookups already treat
    /// expired entries as absent.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, remaining = entries.len(), "Swept expired rate limit entries");
        }
        removed
    }

    /// Number of tracked entries, live or expired. Observability only.
    pub fn entry_count(&self) -> usize {
        self.lock().len()
    }

    /// Spawn a background task sweeping expired entries at `every` interval.
    ///
    /// The task exits once every other handle to the limiter is dropped. The
    /// returned handle may be used to abort the sweeper early.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::downgrade(&self);
        drop(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match limiter.upgrade() {
                    Some(limiter) => {
                        limiter.sweep();
                    }
                    None => break,
                }
            }
        })
    }
}
