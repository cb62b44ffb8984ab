//! API request and response types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::session::{Amount, PaymentStatus, Session};

/// Request to create a new payment session.
///
/// `amount` is kept as raw JSON so that a missing or mistyped amount is
/// reported as a 400 with the usual error body instead of an extractor
/// rejection.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionRequest {
    pub amount: Option<Value>,
}

impl CreateSessionRequest {
    /// Read the request from a raw body.
    ///
    /// Only a JSON object can carry an amount. An empty body, a form body,
    /// malformed JSON and any non-object value all leave it unset.
    pub fn from_body(body: &[u8]) -> Self {
        let amount = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(mut fields)) => fields.remove("amount"),
            _ => None,
        };
        Self { amount }
    }

    /// Validate the requested amount.
    pub fn amount(&self) -> crate::Result<Amount> {
        Amount::from_json(self.amount.as_ref())
    }
}

/// Response for session creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    /// The assigned session ID.
    pub session_id: String,
    /// Page where the payer confirms or cancels.
    pub pay_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl CreateSessionResponse {
    pub fn new(session: &Session, base_url: &str) -> Self {
        Self {
            session_id: session.id.to_string(),
            pay_url: format!("{}/pay/{}", base_url, session.id),
            created_at: session.created_at,
        }
    }
}

/// Response for the status polling endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    pub status: PaymentStatus,
}

/// Generic JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn invalid_amount() -> Self {
        Self::new("Invalid amount. Must be a positive number.")
    }

    pub fn session_not_found() -> Self {
        Self::new("Session not found or expired")
    }

    pub fn internal_error() -> Self {
        Self::new("Internal server error")
    }
}
