//! Rate limiting error types.

/// Rate limiting error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// Too many requests in the current window
    #[display("rate limit of {} exceeded, retry after {} s", limit, retry_after_seconds)]
    LimitExceeded {
        /// Requests allowed per window
        limit: u32,
        /// Seconds until the window resets
        retry_after_seconds: u64,
    },
}

/// Rate limiting error with source location tracking.
///
/// # Examples
///
/// ```
/// use lyceum_error::{RateLimitError, RateLimitErrorKind};
///
/// let err = RateLimitError::new(RateLimitErrorKind::LimitExceeded {
///     limit: 20,
///     retry_after_seconds: 42,
/// });
/// assert!(format!("{}", err).contains("retry after 42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    /// The kind of error that occurred
    pub kind: RateLimitErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RateLimitError {
    /// Create a new RateLimitError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
