//! Payment status state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Session is waiting for the payer to confirm or cancel.
    #[default]
    Pending,
    /// Payer confirmed the payment.
    Success,
    /// Payer cancelled the payment.
    Cancelled,
}

impl PaymentStatus {
    /// Check if transition to target status is valid.
    ///
    /// Valid transitions:
    /// - Pending -> Success
    /// - Pending -> Cancelled
    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!((*self, target), (Pending, Success) | (Pending, Cancelled))
    }

    /// Attempt to transition to a new status.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    /// The status is left untouched on error.
    pub fn transition_to(&mut self, target: PaymentStatus) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::MockPayError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Cancelled)
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
