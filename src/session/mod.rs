//! Session management module.
//!
//! This module owns payment sessions: identification, amounts, the status
//! state machine, time-bounded storage and background eviction.

mod amount;
mod clock;
mod id;
mod state;
mod store;
mod sweeper;

pub use amount::Amount;
pub use clock::{Clock, ManualClock, SystemClock};
pub use id::SessionId;
pub use state::PaymentStatus;
pub use store::{
    Session, SessionStore, StoreConfig, DEFAULT_SESSION_TTL, DEFAULT_SWEEP_INTERVAL,
};
pub use sweeper::{spawn_sweeper, MAX_SWEEP_PERIOD, MIN_SWEEP_PERIOD};
