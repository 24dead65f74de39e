//! Request queue error types.

/// Queue-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QueueErrorKind {
    /// Job exceeded its wall-clock deadline
    #[display("job timed out after {} ms", timeout_ms)]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },
    /// Job was rejected before dispatch by `cancel_all`
    #[display("job cancelled before dispatch")]
    Cancelled,
    /// Job task panicked while executing
    #[display("job panicked: {}", _0)]
    Panicked(String),
}

/// Queue error with source location tracking.
///
/// # Examples
///
/// ```
/// use lyceum_error::{QueueError, QueueErrorKind};
///
/// let err = QueueError::new(QueueErrorKind::Timeout { timeout_ms: 60_000 });
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Queue Error: {} at line {} in {}", kind, line, file)]
pub struct QueueError {
    /// The kind of error that occurred
    pub kind: QueueErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl QueueError {
    /// Create a new QueueError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QueueErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
