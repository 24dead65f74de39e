//! Per-caller daily quota records and decisions.

use crate::AccessTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted daily usage record for one caller.
///
/// `reset_at` is compared by calendar day, not elapsed duration, so the
/// counter rolls over at midnight regardless of when in the day the previous
/// reset occurred. `tier_expires_at` marks the end of a paid entitlement;
/// once passed, the next quota check demotes the caller to the base tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierQuota {
    /// Current entitlement tier
    pub tier: AccessTier,
    /// Requests admitted since the last reset
    pub requests_today: u32,
    /// Timestamp of the last counter reset
    pub reset_at: DateTime<Utc>,
    /// Expiration of the paid entitlement, if any
    pub tier_expires_at: Option<DateTime<Utc>>,
}

impl TierQuota {
    /// A fresh record for a caller with no persisted state.
    pub fn fresh(tier: AccessTier, now: DateTime<Utc>) -> Self {
        Self {
            tier,
            requests_today: 0,
            reset_at: now,
            tier_expires_at: None,
        }
    }
}

/// Why a quota check denied the request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// Paid entitlement lapsed; caller demoted to base tier
    TierExpired,
    /// Daily request limit for the current tier reached
    LimitExceeded,
}

/// Outcome of a single check-and-consume quota evaluation.
///
/// # Examples
///
/// ```
/// use lyceum_core::{AccessTier, DenialReason, QuotaDecision};
///
/// let decision = QuotaDecision {
///     allowed: false,
///     tier: AccessTier::Base,
///     requests_today: 50,
///     limit: 50,
///     reason: Some(DenialReason::LimitExceeded),
/// };
/// assert_eq!(format!("{}", decision.reason.unwrap()), "LIMIT_EXCEEDED");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// The caller's current tier, after any demotion
    pub tier: AccessTier,
    /// Requests counted against today's quota, including this one if allowed
    pub requests_today: u32,
    /// Daily limit for the current tier
    pub limit: u32,
    /// Set when `allowed` is false
    pub reason: Option<DenialReason>,
}
