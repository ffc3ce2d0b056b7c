//! Unified error handling for syndicate-chat.
//!
//! Every fallible room operation returns [`ChatError`]. Variants are grouped
//! into three kinds (validation, not-found, internal) so a transport layer can
//! map them onto its own status codes without matching every variant.

use thiserror::Error;

// ============================================================================
// Error kinds
// ============================================================================

/// Coarse classification of a [`ChatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input violated a stated constraint. No state was changed.
    Validation,
    /// A referenced message does not exist. No state was changed.
    NotFound,
    /// An invariant broke. Fatal to the single request only.
    Internal,
}

// ============================================================================
// Chat errors (room operations)
// ============================================================================

/// Errors returned by room operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message text is {len} characters, limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("message text is empty")]
    EmptyMessage,

    #[error("page size {requested} outside 1..={max}")]
    InvalidPageSize { requested: usize, max: usize },

    #[error("no such message: {0}")]
    MessageNotFound(String),

    /// The room actor stopped before answering.
    #[error("room {0} is unavailable")]
    RoomUnavailable(String),
}

impl ChatError {
    /// Which taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MessageTooLong { .. } | Self::EmptyMessage | Self::InvalidPageSize { .. } => {
                ErrorKind::Validation
            }
            Self::MessageNotFound(_) => ErrorKind::NotFound,
            Self::RoomUnavailable(_) => ErrorKind::Internal,
        }
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MessageTooLong { .. } => "message_too_long",
            Self::EmptyMessage => "empty_message",
            Self::InvalidPageSize { .. } => "invalid_page_size",
            Self::MessageNotFound(_) => "message_not_found",
            Self::RoomUnavailable(_) => "room_unavailable",
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Result type for room operations.
pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ChatError::EmptyMessage.error_code(), "empty_message");
        assert_eq!(ChatError::MessageNotFound("m1".into()).error_code(), "message_not_found");
        assert_eq!(ChatError::RoomUnavailable("r1".into()).error_code(), "room_unavailable");
    }

    #[test]
    fn test_error_kinds() {
        let too_long = ChatError::MessageTooLong { len: 501, max: 500 };
        assert_eq!(too_long.kind(), ErrorKind::Validation);
        assert!(too_long.is_validation());

        assert!(ChatError::MessageNotFound("m1".into()).is_not_found());
        assert_eq!(ChatError::RoomUnavailable("r1".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_display_includes_limits() {
        let err = ChatError::InvalidPageSize { requested: 0, max: 100 };
        assert_eq!(err.to_string(), "page size 0 outside 1..=100");
    }
}
