//! Daily quota error types.

/// Quota-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QuotaErrorKind {
    /// Caller has used all requests allowed for its tier today
    #[display("daily quota exceeded for tier {}: limit {}", tier, limit)]
    LimitExceeded {
        /// The tier the limit belongs to
        tier: String,
        /// The daily request limit
        limit: u32,
    },
    /// Paid entitlement lapsed; the caller was demoted to the base tier
    #[display("tier {} has expired", tier)]
    TierExpired {
        /// The tier that expired
        tier: String,
    },
    /// The backing store failed to read or write a quota record
    #[display("quota store error: {}", _0)]
    Store(String),
}

/// Quota error with source location tracking.
///
/// # Examples
///
/// ```
/// use lyceum_error::{QuotaError, QuotaErrorKind};
///
/// let err = QuotaError::new(QuotaErrorKind::TierExpired {
///     tier: "premium".to_string(),
/// });
/// assert!(format!("{}", err).contains("expired"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Quota Error: {} at line {} in {}", kind, line, file)]
pub struct QuotaError {
    /// The kind of error that occurred
    pub kind: QuotaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl QuotaError {
    /// Create a new QuotaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QuotaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
