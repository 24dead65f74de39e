//! Response-header style rate limit metadata.

use serde::{Deserialize, Serialize};

/// Rate limit metadata for one admitted or denied request.
///
/// The serving layer forwards these values to end clients as standard
/// rate-limit response headers.
///
/// # Examples
///
/// ```
/// use lyceum_core::RateLimitSummary;
///
/// let summary = RateLimitSummary {
///     limit: 20,
///     remaining: 0,
///     retry_after_seconds: Some(42),
/// };
///
/// let headers = summary.as_headers();
/// assert!(headers.contains(&("x-ratelimit-limit", "20".to_string())));
/// assert!(headers.contains(&("retry-after", "42".to_string())));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSummary {
    /// Requests allowed in the current window
    pub limit: u32,
    /// Requests remaining in the current window
    pub remaining: u32,
    /// Seconds until the window resets, set when the caller should back off
    pub retry_after_seconds: Option<u64>,
}

impl RateLimitSummary {
    /// Render as response header pairs.
    pub fn as_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("x-ratelimit-limit", self.limit.to_string()),
            ("x-ratelimit-remaining", self.remaining.to_string()),
        ];
        if let Some(seconds) = self.retry_after_seconds {
            headers.push(("retry-after", seconds.to_string()));
        }
        headers
    }
}
