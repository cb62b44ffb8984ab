//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a payment session.
///
/// Session IDs are random v4 UUIDs, so they are opaque to callers and
/// collision-free for any practical number of sessions. The ID is displayed
/// in the hyphenated lowercase form, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a SessionId from an existing UUID.
    ///
    /// This is primarily for testing.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SessionId {
    type Err = crate::error::MockPayError;

    /// Anything that is not a UUID cannot name a session, so it parses to
    /// `SessionNotFound` rather than a separate syntax error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(SessionId)
            .map_err(|_| crate::error::MockPayError::SessionNotFound(s.into()))
    }
}
