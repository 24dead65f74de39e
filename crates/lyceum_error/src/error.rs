//! Top-level error wrapper types.

use crate::{
    ConfigError, ProviderError, QueueError, QueueErrorKind, QuotaError, QuotaErrorKind,
    RateLimitError, RetryableError,
};

/// This is the foundation error enum covering every failure the
/// orchestration core can surface to a caller.
///
/// # Examples
///
/// ```
/// use lyceum_error::{LyceumError, ConfigError};
///
/// let cfg_err = ConfigError::new("bad TOML");
/// let err: LyceumError = cfg_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum LyceumErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Model provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Request queue error
    #[from(QueueError)]
    Queue(QueueError),
    /// Daily quota error
    #[from(QuotaError)]
    Quota(QuotaError),
    /// Rate limiting error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
}

/// Lyceum error with kind discrimination.
///
/// # Examples
///
/// ```
/// use lyceum_error::{LyceumResult, ConfigError};
///
/// fn might_fail() -> LyceumResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Lyceum Error: {}", _0)]
pub struct LyceumError(Box<LyceumErrorKind>);

impl LyceumError {
    /// Create a new error from a kind.
    pub fn new(kind: LyceumErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &LyceumErrorKind {
        &self.0
    }

    /// True if this error is a queue timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self.kind(),
            LyceumErrorKind::Queue(QueueError {
                kind: QueueErrorKind::Timeout { .. },
                ..
            })
        )
    }

    /// True if this error is a queue cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.kind(),
            LyceumErrorKind::Queue(QueueError {
                kind: QueueErrorKind::Cancelled,
                ..
            })
        )
    }

    /// True if this error is a rate limiter denial.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind(), LyceumErrorKind::RateLimit(_))
    }

    /// True if this error is a quota denial (volume limit or lapsed tier).
    pub fn is_quota_denial(&self) -> bool {
        matches!(
            self.kind(),
            LyceumErrorKind::Quota(QuotaError {
                kind: QuotaErrorKind::LimitExceeded { .. } | QuotaErrorKind::TierExpired { .. },
                ..
            })
        )
    }
}

impl RetryableError for LyceumError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            LyceumErrorKind::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to LyceumErrorKind
impl<T> From<T> for LyceumError
where
    T: Into<LyceumErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for lyceum operations.
///
/// # Examples
///
/// ```
/// use lyceum_error::{LyceumResult, ConfigError};
///
/// fn load() -> LyceumResult<String> {
///     Err(ConfigError::new("no such file"))?
/// }
/// ```
pub type LyceumResult<T> = std::result::Result<T, LyceumError>;
