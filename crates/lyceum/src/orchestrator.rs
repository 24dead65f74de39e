//! Composition of the orchestration components for the serving layer.

use lyceum_core::{
    DenialReason, GenerateOptions, LyceumConfig, Message, QuotaDecision, RateLimitSettings,
    RateLimitSummary,
};
use lyceum_error::{
    LyceumResult, QuotaError, QuotaErrorKind, RateLimitError, RateLimitErrorKind, RetryableError,
};
use lyceum_interface::{ChatProvider, QuotaStore};
use lyceum_queue::{JobHandle, JobOptions, RequestQueue};
use lyceum_quota::QuotaTracker;
use lyceum_rate_limit::{RateLimiter, RetryPolicy};
use lyceum_router::{RoutedCompletion, RouteTable, TieredRouter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Outcome of a successful admission check.
///
/// Carries the quota decision (whose tier may differ from the entitlement
/// lookup after a demotion) and the rate-limit metadata the serving layer
/// surfaces as response headers.
#[derive(Debug, Clone, Copy)]
pub struct Admission {
    /// The quota evaluation for this request
    pub quota: QuotaDecision,
    /// Window state after this request was counted
    pub rate_limit: RateLimitSummary,
}

/// Explicitly constructed orchestration core, one instance per service.
///
/// Construct once at startup and pass by reference to callers; there is no
/// hidden global state. The admission order is fixed: rate limiter first,
/// quota tracker second, and only admitted requests reach the queue.
pub struct Orchestrator {
    limiter: Arc<RateLimiter>,
    quota: QuotaTracker,
    queue: RequestQueue<RoutedCompletion>,
    routes: Arc<RouteTable>,
    provider: Arc<dyn ChatProvider>,
    retry: RetryPolicy,
    rate: RateLimitSettings,
    default_timeout: Duration,
}

impl Orchestrator {
    /// Wire an orchestration core from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no base-tier route is configured.
    pub fn new(
        config: &LyceumConfig,
        provider: Arc<dyn ChatProvider>,
        store: Arc<dyn QuotaStore>,
    ) -> LyceumResult<Self> {
        let routes = Arc::new(RouteTable::from_config(config)?);
        info!(
            concurrency = config.queue.concurrency,
            window_limit = config.rate_limit.requests_per_window,
            "Starting orchestration core"
        );
        Ok(Self {
            limiter: Arc::new(RateLimiter::new()),
            quota: QuotaTracker::from_config(store, config),
            queue: RequestQueue::new(config.queue.concurrency),
            routes,
            provider,
            retry: RetryPolicy::from_settings(&config.retry),
            rate: config.rate_limit,
            default_timeout: Duration::from_millis(config.queue.default_timeout_ms),
        })
    }

    fn bucket(caller: &str) -> String {
        format!("chat:{caller}")
    }

    /// Seconds until the caller's window resets, rounded up.
    fn retry_after_seconds(&self, bucket: &str) -> u64 {
        match self.limiter.get_reset_time(bucket) {
            Some(reset_at) => {
                let remaining = reset_at.saturating_duration_since(Instant::now());
                let seconds = remaining.as_secs();
                if remaining.subsec_nanos() > 0 {
                    seconds + 1
                } else {
                    seconds
                }
            }
            None => 0,
        }
    }

    /// Current rate-limit metadata for a caller, without consuming anything.
    pub fn rate_limit_summary(&self, caller: &str) -> RateLimitSummary {
        let bucket = Self::bucket(caller);
        let limit = self.rate.requests_per_window;
        let remaining = self.limiter.get_remaining(&bucket, limit);
        let retry_after_seconds = if remaining == 0 {
            Some(self.retry_after_seconds(&bucket))
        } else {
            None
        };
        RateLimitSummary {
            limit,
            remaining,
            retry_after_seconds,
        }
    }

    /// Admit or reject a request before any work is enqueued.
    ///
    /// The rate limiter is consulted first, so a burst-limited caller does
    /// not consume daily quota. Denials are terminal, typed rejections; they
    /// never reach the queue.
    #[instrument(skip(self))]
    pub async fn admit(&self, caller: &str) -> LyceumResult<Admission> {
        let bucket = Self::bucket(caller);
        let limit = self.rate.requests_per_window;
        let window = Duration::from_secs(self.rate.window_seconds);

        if !self.limiter.check(&bucket, limit, window) {
            let retry_after_seconds = self.retry_after_seconds(&bucket);
            debug!(caller, limit, retry_after_seconds, "Rate limited");
            return Err(RateLimitError::new(RateLimitErrorKind::LimitExceeded {
                limit,
                retry_after_seconds,
            })
            .into());
        }

        let decision = self.quota.check_and_consume(caller).await?;
        if !decision.allowed {
            debug!(caller, tier = %decision.tier, reason = ?decision.reason, "Quota denied");
            let kind = match decision.reason {
                Some(DenialReason::TierExpired) => QuotaErrorKind::TierExpired {
                    tier: decision.tier.to_string(),
                },
                _ => QuotaErrorKind::LimitExceeded {
                    tier: decision.tier.to_string(),
                    limit: decision.limit,
                },
            };
            return Err(QuotaError::new(kind).into());
        }

        Ok(Admission {
            quota: decision,
            rate_limit: self.rate_limit_summary(caller),
        })
    }

    /// Enqueue an admitted request as a routed, retried provider call.
    ///
    /// The job body wraps the tier-routed call in this core's retry policy,
    /// so backoff delays count against the job's own concurrency slot and
    /// the queue itself never retries. Quota was already consumed at
    /// admission; a provider failure does not refund it.
    pub fn submit(
        &self,
        admission: &Admission,
        caller: &str,
        messages: &[Message],
        options: GenerateOptions,
        mut job: JobOptions,
    ) -> JobHandle<RoutedCompletion> {
        let router = TieredRouter::new(
            admission.quota.tier,
            self.routes.clone(),
            self.provider.clone(),
        );
        let retry = self.retry;
        let messages = messages.to_vec();

        job.metadata.insert("caller".to_string(), caller.to_string());
        job.metadata
            .insert("tier".to_string(), admission.quota.tier.to_string());

        self.queue.enqueue(
            move || async move {
                retry
                    .run_if(
                        || router.chat_completion(&messages, &options),
                        RetryableError::is_retryable,
                    )
                    .await
            },
            job,
        )
    }

    /// Admit, enqueue, and await one chat completion for a caller.
    #[instrument(skip(self, messages, options))]
    pub async fn chat(
        &self,
        caller: &str,
        messages: &[Message],
        options: GenerateOptions,
    ) -> LyceumResult<RoutedCompletion> {
        let admission = self.admit(caller).await?;
        let job = JobOptions::default().with_timeout(self.default_timeout);
        self.submit(&admission, caller, messages, options, job).await
    }

    /// Jobs waiting for dispatch. Observability only.
    pub fn queue_size(&self) -> usize {
        self.queue.queue_size()
    }

    /// Jobs currently executing. Observability only.
    pub fn active_count(&self) -> usize {
        self.queue.active_count()
    }

    /// Reject all undispatched jobs; in-flight jobs run to completion.
    pub fn shutdown(&self) {
        info!("Shutting down orchestration core");
        self.queue.cancel_all();
    }
}
