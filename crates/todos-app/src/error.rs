//! User-facing error state raised by the synchronization core.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;
use tokio::time::Instant;

/// Boxed store failure carried by [`SyncError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Cause of the currently displayed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Failure without a more specific cause.
    Unknown,
    /// The initial list request failed.
    LoadFailure,
    /// A title was empty after trimming.
    ValidationFailure,
    /// Creating an item failed.
    AddFailure,
    /// Deleting an item failed.
    DeleteFailure,
    /// Updating an item failed.
    UpdateFailure,
}

impl ErrorKind {
    /// Banner text shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Unknown => "Something went wrong",
            Self::LoadFailure => "Unable to load todos",
            Self::ValidationFailure => "Title should not be empty",
            Self::AddFailure => "Unable to add a todo",
            Self::DeleteFailure => "Unable to delete a todo",
            Self::UpdateFailure => "Unable to update a todo",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The single active error. A newer notice always replaces an older one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorNotice {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Monotonic sequence number, distinct for every raised error.
    pub seq: u64,
    /// When the error was raised; the dwell timer starts here.
    pub raised_at: Instant,
}

impl ErrorNotice {
    /// Whether `dwell` has elapsed since the notice was raised.
    #[must_use]
    pub fn is_expired(&self, dwell: std::time::Duration) -> bool {
        self.raised_at.elapsed() >= dwell
    }
}

/// Failure re-raised to callers that need to react to it (inline rename).
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct SyncError {
    kind: ErrorKind,
    #[source]
    source: BoxError,
}

impl SyncError {
    pub(crate) fn new(kind: ErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// Kind recorded in the error state for this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn messages_match_banner_texts() {
        assert_eq!(ErrorKind::LoadFailure.to_string(), "Unable to load todos");
        assert_eq!(ErrorKind::ValidationFailure.message(), "Title should not be empty");
        assert_eq!(ErrorKind::Unknown.message(), "Something went wrong");
    }

    #[test]
    fn sync_error_exposes_source() {
        let err = SyncError::new(ErrorKind::UpdateFailure, "connection reset");
        assert_eq!(err.kind(), ErrorKind::UpdateFailure);
        assert_eq!(err.to_string(), "Unable to update a todo");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn notice_expires_after_dwell() {
        let notice = ErrorNotice {
            kind: ErrorKind::AddFailure,
            seq: 1,
            raised_at: Instant::now(),
        };
        assert!(!notice.is_expired(Duration::from_millis(3000)));
        tokio::time::advance(Duration::from_millis(3000)).await;
        assert!(notice.is_expired(Duration::from_millis(3000)));
    }
}
