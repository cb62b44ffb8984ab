//! Validated payment amount.

use std::fmt;

use serde::Serialize;

use crate::error::MockPayError;

/// A finite, strictly positive payment amount.
///
/// The store accepts only this type, so an invalid amount is rejected by
/// whoever builds it and never reaches a session record. No currency bounds
/// or precision rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    /// Validate a raw number.
    pub fn new(value: f64) -> crate::Result<Self> {
        if !value.is_finite() {
            return Err(MockPayError::InvalidAmount(format!(
                "{value} is not a finite number"
            )));
        }
        if value <= 0.0 {
            return Err(MockPayError::InvalidAmount(format!(
                "{value} is not positive"
            )));
        }
        Ok(Self(value))
    }

    /// Validate a JSON value as received in a request body.
    ///
    /// Strings, booleans and other non-number values are rejected even when
    /// they would parse as a number.
    pub fn from_json(value: Option<&serde_json::Value>) -> crate::Result<Self> {
        match value {
            None | Some(serde_json::Value::Null) => {
                Err(MockPayError::InvalidAmount("amount is required".into()))
            }
            Some(serde_json::Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| MockPayError::InvalidAmount(n.to_string()))
                .and_then(Self::new),
            Some(other) => Err(MockPayError::InvalidAmount(format!(
                "{other} is not a number"
            ))),
        }
    }

    /// Raw value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
