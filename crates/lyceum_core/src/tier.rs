//! Entitlement tiers controlling model quality and daily volume.

use serde::{Deserialize, Serialize};

/// Ordered entitlement tier for a caller.
///
/// Tiers are ordered by entitlement level, so `Base < Standard < Premium`.
/// Unrecognized tier names degrade to `Base` rather than failing, since
/// entitlement lookups upstream can be stale.
///
/// # Examples
///
/// ```
/// use lyceum_core::AccessTier;
///
/// assert!(AccessTier::Base < AccessTier::Premium);
/// assert_eq!(AccessTier::from_name("premium"), AccessTier::Premium);
/// assert_eq!(AccessTier::from_name("platinum"), AccessTier::Base);
/// assert_eq!(AccessTier::Standard.as_str(), "standard");
/// ```
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
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccessTier {
    /// Free entitlement, the fallback target for every paid tier
    #[default]
    Base,
    /// Entry paid entitlement
    Standard,
    /// Top paid entitlement
    Premium,
}

impl AccessTier {
    /// Parse a tier name, degrading to `Base` on anything unrecognized.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// The lowercase name of this tier, matching configuration keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTier::Base => "base",
            AccessTier::Standard => "standard",
            AccessTier::Premium => "premium",
        }
    }

    /// True for the free tier.
    pub fn is_base(&self) -> bool {
        matches!(self, AccessTier::Base)
    }
}
