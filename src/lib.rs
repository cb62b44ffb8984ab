//! # mock-pay
//!
//! Mock payment-session simulator.
//!
//! Issues an opaque session for a requested amount, serves an HTML
//! confirmation page, and lets the payer confirm or cancel it while the
//! merchant polls for the outcome. Nothing is charged and nothing outlives
//! the process.
//!
//! ## Features
//!
//! - **Session lifecycle store**: `pending → success | cancelled`, exactly once
//! - **Time-bounded sessions**: expiry checked on every access, plus a
//!   background sweep to reclaim memory
//! - **HTTP API**: JSON endpoints for merchants, HTML pages for payers
//!
//! ## Quick Start
//!
//! ```
//! use mock_pay::{Amount, PaymentStatus, SessionStore};
//!
//! # fn main() -> mock_pay::Result<()> {
//! let store = SessionStore::new();
//!
//! let session = store.create(Amount::new(50_000.0)?)?;
//! assert_eq!(session.status, PaymentStatus::Pending);
//!
//! let confirmed = store.transition(&session.id, PaymentStatus::Success)?;
//! assert_eq!(confirmed.status, PaymentStatus::Success);
//!
//! // A finalized session cannot change again.
//! assert!(store.transition(&session.id, PaymentStatus::Cancelled).is_err());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use error::{MockPayError, Result};
pub use session::{
    spawn_sweeper, Amount, Clock, ManualClock, PaymentStatus, Session, SessionId, SessionStore,
    StoreConfig, SystemClock,
};
