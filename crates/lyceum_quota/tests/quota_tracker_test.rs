//! Tests for daily quota tracking and tier expiration.

use chrono::{Duration, Utc};
use lyceum_core::{AccessTier, DenialReason, TierQuota};
use lyceum_interface::QuotaStore;
use lyceum_quota::{MemoryQuotaStore, QuotaTracker};
use std::collections::HashMap;
use std::sync::Arc;

fn test_limits() -> HashMap<AccessTier, u32> {
    HashMap::from([
        (AccessTier::Base, 50),
        (AccessTier::Standard, 500),
        (AccessTier::Premium, 2_000),
    ])
}

fn tracker_with_store() -> (QuotaTracker, MemoryQuotaStore) {
    let store = MemoryQuotaStore::new();
    let tracker = QuotaTracker::new(Arc::new(store.clone()), test_limits());
    (tracker, store)
}

#[tokio::test]
async fn unknown_caller_starts_as_fresh_base_tier() {
    let (tracker, store) = tracker_with_store();

    let decision = tracker.check_and_consume("newcomer").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.tier, AccessTier::Base);
    assert_eq!(decision.requests_today, 1);
    assert_eq!(decision.limit, 50);
    assert_eq!(decision.reason, None);

    // The consumed unit was persisted.
    let record = store.load("newcomer").await.unwrap().unwrap();
    assert_eq!(record.requests_today, 1);
}

#[tokio::test]
async fn denies_at_limit_without_incrementing() {
    let (tracker, store) = tracker_with_store();
    let mut quota = TierQuota::fresh(AccessTier::Base, Utc::now());
    quota.requests_today = 50;
    store.save("heavy-user", &quota).await.unwrap();

    let decision = tracker.check_and_consume("heavy-user").await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenialReason::LimitExceeded));
    assert_eq!(decision.requests_today, 50);
    assert_eq!(decision.limit, 50);

    // A denied call must not consume quota.
    let record = store.load("heavy-user").await.unwrap().unwrap();
    assert_eq!(record.requests_today, 50);
}

#[tokio::test]
async fn counter_resets_on_new_calendar_day() {
    let (tracker, store) = tracker_with_store();
    let mut quota = TierQuota::fresh(AccessTier::Base, Utc::now() - Duration::days(1));
    quota.requests_today = 50;
    store.save("returning-user", &quota).await.unwrap();

    // Yesterday's exhausted counter resets before evaluation, so the call
    // is allowed.
    let decision = tracker.check_and_consume("returning-user").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.requests_today, 1);

    let record = store.load("returning-user").await.unwrap().unwrap();
    assert_eq!(record.requests_today, 1);
    assert!(record.reset_at > Utc::now() - Duration::minutes(1));
}

#[tokio::test]
async fn expired_tier_is_demoted_and_denied_once() {
    let (tracker, store) = tracker_with_store();
    let now = Utc::now();
    let quota = TierQuota {
        tier: AccessTier::Premium,
        requests_today: 10,
        reset_at: now,
        tier_expires_at: Some(now - Duration::hours(1)),
    };
    store.save("lapsed-subscriber", &quota).await.unwrap();

    let decision = tracker.check_and_consume("lapsed-subscriber").await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenialReason::TierExpired));
    assert_eq!(decision.tier, AccessTier::Base);
    assert_eq!(decision.limit, 50);

    // The demotion is persisted even though the call was denied.
    let record = store.load("lapsed-subscriber").await.unwrap().unwrap();
    assert_eq!(record.tier, AccessTier::Base);
    assert_eq!(record.tier_expires_at, None);

    // The next call is evaluated under base-tier limits.
    let next = tracker.check_and_consume("lapsed-subscriber").await.unwrap();
    assert!(next.allowed);
    assert_eq!(next.tier, AccessTier::Base);
    assert_eq!(next.requests_today, 11);
}

#[tokio::test]
async fn demoted_caller_cannot_exceed_base_limit() {
    let (tracker, store) = tracker_with_store();
    let now = Utc::now();
    // Usage that was fine under premium but is over the base-tier limit.
    let quota = TierQuota {
        tier: AccessTier::Premium,
        requests_today: 60,
        reset_at: now,
        tier_expires_at: Some(now - Duration::minutes(5)),
    };
    store.save("downgraded", &quota).await.unwrap();

    let first = tracker.check_and_consume("downgraded").await.unwrap();
    assert_eq!(first.reason, Some(DenialReason::TierExpired));

    let second = tracker.check_and_consume("downgraded").await.unwrap();
    assert!(!second.allowed);
    assert_eq!(second.reason, Some(DenialReason::LimitExceeded));
    assert_eq!(second.tier, AccessTier::Base);
}

#[tokio::test]
async fn unexpired_paid_tier_uses_its_own_limit() {
    let (tracker, store) = tracker_with_store();
    let now = Utc::now();
    let quota = TierQuota {
        tier: AccessTier::Standard,
        requests_today: 499,
        reset_at: now,
        tier_expires_at: Some(now + Duration::days(30)),
    };
    store.save("subscriber", &quota).await.unwrap();

    let decision = tracker.check_and_consume("subscriber").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.tier, AccessTier::Standard);
    assert_eq!(decision.requests_today, 500);

    let at_limit = tracker.check_and_consume("subscriber").await.unwrap();
    assert!(!at_limit.allowed);
    assert_eq!(at_limit.reason, Some(DenialReason::LimitExceeded));
}

#[tokio::test]
async fn concurrent_checks_never_overrun_the_limit() {
    let store = MemoryQuotaStore::new();
    let limits = HashMap::from([(AccessTier::Base, 5)]);
    let tracker = Arc::new(QuotaTracker::new(Arc::new(store.clone()), limits));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.check_and_consume("burst").await.unwrap() })
        })
        .collect();

    let decisions = futures::future::join_all(handles).await;
    let allowed = decisions
        .into_iter()
        .filter(|d| d.as_ref().unwrap().allowed)
        .count();
    assert_eq!(allowed, 5);

    let record = store.load("burst").await.unwrap().unwrap();
    assert_eq!(record.requests_today, 5);
}
