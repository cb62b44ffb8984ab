//! Error types for mock-pay.

use thiserror::Error;

use crate::session::PaymentStatus;

/// Main error type for mock-pay operations.
#[derive(Error, Debug)]
pub enum MockPayError {
    /// Session with the given ID does not exist or has expired.
    #[error("session not found or expired: {0}")]
    SessionNotFound(String),

    /// Session has already left the pending state.
    #[error("session {id} already finalized as {status}")]
    AlreadyFinalized { id: String, status: PaymentStatus },

    /// Amount is missing, not a number, not finite, or not positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid state transition attempted.
    #[error("invalid status transition from {from} to {to}")]
    InvalidStateTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MockPayError {
    /// Whether the error means the session is absent or past its TTL.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }

    /// Whether the error means the session was already confirmed or cancelled.
    pub fn is_already_finalized(&self) -> bool {
        matches!(self, Self::AlreadyFinalized { .. })
    }
}

/// Convenience Result type for mock-pay operations.
pub type Result<T> = std::result::Result<T, MockPayError>;
