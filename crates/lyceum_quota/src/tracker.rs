//! Tier-aware daily usage tracking with expiration-driven downgrade.

use chrono::{Local, Utc};
use lyceum_core::{AccessTier, DenialReason, LyceumConfig, QuotaDecision, TierQuota};
use lyceum_error::LyceumResult;
use lyceum_interface::QuotaStore;
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Daily quota tracker backed by an external store.
///
/// [`QuotaTracker::check_and_consume`] is a single atomic operation: it
/// demotes lapsed paid tiers, rolls the counter over on a new calendar day,
/// enforces the current tier's limit, and consumes one unit, persisting every
/// state change as it goes. Splitting the check from the consume would let
/// two concurrent requests both pass before either counted.
///
/// # Examples
///
/// ```
/// use lyceum_core::AccessTier;
/// use lyceum_quota::{MemoryQuotaStore, QuotaTracker};
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let limits = HashMap::from([(AccessTier::Base, 50)]);
/// let tracker = QuotaTracker::new(Arc::new(MemoryQuotaStore::new()), limits);
///
/// let decision = tracker.check_and_consume("alice").await.unwrap();
/// assert!(decision.allowed);
/// assert_eq!(decision.requests_today, 1);
/// # }
/// ```
pub struct QuotaTracker {
    store: Arc<dyn QuotaStore>,
    limits: HashMap<AccessTier, u32>,
    // Serializes check-and-consume so concurrent callers cannot interleave
    // between the limit check and the increment.
    op_lock: Mutex<()>,
}

impl QuotaTracker {
    /// Create a tracker with explicit per-tier daily limits.
    pub fn new(store: Arc<dyn QuotaStore>, limits: HashMap<AccessTier, u32>) -> Self {
        Self {
            store,
            limits,
            op_lock: Mutex::new(()),
        }
    }

    /// Create a tracker with limits taken from loaded configuration.
    pub fn from_config(store: Arc<dyn QuotaStore>, config: &LyceumConfig) -> Self {
        let limits = AccessTier::iter()
            .filter_map(|tier| config.daily_limit(tier).map(|limit| (tier, limit)))
            .collect();
        Self::new(store, limits)
    }

    /// Daily limit for a tier; unconfigured tiers admit nothing.
    pub fn limit_for(&self, tier: AccessTier) -> u32 {
        match self.limits.get(&tier) {
            Some(limit) => *limit,
            None => {
                warn!(tier = %tier, "No daily limit configured, denying by default");
                0
            }
        }
    }

    /// Evaluate and consume one unit of the caller's daily quota.
    ///
    /// Safe to call exactly once per admitted request. The evaluation order
    /// is fixed:
    ///
    /// 1. Missing record: the caller starts as a fresh base-tier user.
    /// 2. Lapsed `tier_expires_at` on a paid tier: persist a demotion to
    ///    base (expiration cleared) and deny with `TierExpired`. The
    ///    demotion is persisted even though this call is denied, so the next
    ///    call is evaluated correctly.
    /// 3. `reset_at` on an earlier calendar day: zero the counter and
    ///    persist the new reset timestamp.
    /// 4. At the current tier's limit: deny with `LimitExceeded`, no
    ///    increment.
    /// 5. Otherwise increment, persist, allow.
    ///
    /// The unit is consumed before any provider call is made, so a failed
    /// provider call still counts against the day's quota.
    #[instrument(skip(self))]
    pub async fn check_and_consume(&self, caller: &str) -> LyceumResult<QuotaDecision> {
        let _guard = self.op_lock.lock().await;
        let now = Utc::now();

        let mut quota = match self.store.load(caller).await? {
            Some(quota) => quota,
            None => {
                debug!(caller, "No quota record, treating as fresh base-tier caller");
                TierQuota::fresh(AccessTier::Base, now)
            }
        };

        if let Some(expires_at) = quota.tier_expires_at
            && expires_at < now
            && !quota.tier.is_base()
        {
            let lapsed = quota.tier;
            quota.tier = AccessTier::Base;
            quota.tier_expires_at = None;
            self.store.save(caller, &quota).await?;
            info!(caller, tier = %lapsed, "Tier expired, demoted to base");
            return Ok(QuotaDecision {
                allowed: false,
                tier: AccessTier::Base,
                requests_today: quota.requests_today,
                limit: self.limit_for(AccessTier::Base),
                reason: Some(DenialReason::TierExpired),
            });
        }

        // Counters roll over at local midnight: compare calendar days, not
        // elapsed duration.
        let today = now.with_timezone(&Local).date_naive();
        if quota.reset_at.with_timezone(&Local).date_naive() < today {
            debug!(caller, spent = quota.requests_today, "New calendar day, resetting counter");
            quota.requests_today = 0;
            quota.reset_at = now;
            self.store.save(caller, &quota).await?;
        }

        let limit = self.limit_for(quota.tier);
        if quota.requests_today >= limit {
            debug!(caller, tier = %quota.tier, limit, "Daily quota exhausted");
            return Ok(QuotaDecision {
                allowed: false,
                tier: quota.tier,
                requests_today: quota.requests_today,
                limit,
                reason: Some(DenialReason::LimitExceeded),
            });
        }

        quota.requests_today += 1;
        self.store.save(caller, &quota).await?;
        debug!(caller, tier = %quota.tier, used = quota.requests_today, limit, "Request admitted");
        Ok(QuotaDecision {
            allowed: true,
            tier: quota.tier,
            requests_today: quota.requests_today,
            limit,
            reason: None,
        })
    }
}
