//! Session storage and lifecycle management.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Amount, Clock, PaymentStatus, SessionId, SystemClock};
use crate::error::MockPayError;
use crate::Result;

/// Default session lifetime: 10 minutes.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(10 * 60);

/// Default interval between background sweeps: 1 minute.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Store-wide lifetime settings, fixed for the life of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// How long a session stays live after creation.
    pub ttl: Duration,
    /// How often the background sweeper evicts expired sessions.
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_SESSION_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// A payment session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier.
    pub id: SessionId,
    /// Requested amount.
    pub amount: Amount,
    /// Current status.
    pub status: PaymentStatus,
    /// Time when session was created.
    pub created_at: DateTime<Utc>,
    /// Time of the status transition, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a pending session.
    pub fn new(id: SessionId, amount: Amount, now: DateTime<Utc>) -> Self {
        Self {
            id,
            amount,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: None,
        }
    }

    /// Whether the session is past its lifetime at `now`.
    ///
    /// A session aged exactly `ttl` is still live.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.created_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

/// Thread-safe storage for payment sessions.
///
/// Every read and write re-checks expiry, so a session past its TTL is
/// invisible even if the sweeper has not removed it yet.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create a new empty session store with default settings.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a new empty session store using the system clock.
    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new empty session store with a custom time source.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Store settings.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Create a new pending session for the given amount.
    pub fn create(&self, amount: Amount) -> Result<Session> {
        let session = Session::new(SessionId::new(), amount, self.clock.now());

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| MockPayError::LockPoisoned)?;

        sessions.insert(session.id, session.clone());
        tracing::debug!(session_id = %session.id, amount = %amount, "session created");
        Ok(session)
    }

    /// Get a clone of the live session with the given ID.
    ///
    /// An expired session is evicted and reported as not found.
    pub fn get(&self, id: &SessionId) -> Result<Session> {
        let now = self.clock.now();
        {
            let sessions = self
                .sessions
                .read()
                .map_err(|_| MockPayError::LockPoisoned)?;

            match sessions.get(id) {
                None => return Err(MockPayError::SessionNotFound(id.to_string())),
                Some(session) if !session.is_expired(now, self.config.ttl) => {
                    return Ok(session.clone())
                }
                Some(_) => {}
            }
        }

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| MockPayError::LockPoisoned)?;
        Self::live_entry(&mut sessions, id, now, self.config.ttl).cloned()
    }

    /// Move a pending session to a terminal status.
    ///
    /// The status check and the update happen under one write lock, so of
    /// two concurrent calls on the same session exactly one succeeds.
    pub fn transition(&self, id: &SessionId, target: PaymentStatus) -> Result<Session> {
        let now = self.clock.now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| MockPayError::LockPoisoned)?;

        let session = Self::live_entry(&mut sessions, id, now, self.config.ttl)?;

        if session.status.is_terminal() {
            return Err(MockPayError::AlreadyFinalized {
                id: id.to_string(),
                status: session.status,
            });
        }

        session.status.transition_to(target)?;
        session.updated_at = Some(now);
        tracing::debug!(session_id = %id, status = %target, "session finalized");
        Ok(session.clone())
    }

    /// Remove every session past its TTL.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep(&self) -> Result<usize> {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| MockPayError::LockPoisoned)?;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, ttl));
        Ok(before - sessions.len())
    }

    /// Number of records held, including expired ones not yet evicted.
    ///
    /// The map is never left half-updated, so a poisoned lock still reports
    /// the true size.
    pub fn count(&self) -> usize {
        match self.sessions.read() {
            Ok(sessions) => sessions.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn live_entry<'a>(
        sessions: &'a mut HashMap<SessionId, Session>,
        id: &SessionId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<&'a mut Session> {
        let expired = match sessions.get(id) {
            None => return Err(MockPayError::SessionNotFound(id.to_string())),
            Some(session) => session.is_expired(now, ttl),
        };

        if expired {
            sessions.remove(id);
            tracing::debug!(session_id = %id, "expired session evicted on access");
            return Err(MockPayError::SessionNotFound(id.to_string()));
        }

        sessions
            .get_mut(id)
            .ok_or_else(|| MockPayError::SessionNotFound(id.to_string()))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ManualClock;

    fn amount(value: f64) -> Amount {
        Amount::new(value).unwrap()
    }

    fn store_with_clock() -> (SessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let store = SessionStore::with_clock(StoreConfig::default(), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_create_session() {
        let store = SessionStore::new();
        let session = store.create(amount(50000.0)).unwrap();

        assert_eq!(session.status, PaymentStatus::Pending);
        assert_eq!(session.amount.value(), 50000.0);
        assert!(session.updated_at.is_none());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_get_session_unchanged() {
        let store = SessionStore::new();
        let created = store.create(amount(1.5)).unwrap();

        let fetched = store.get(&created.id).unwrap();
        assert_eq!(fetched, created);
        // Reads have no side effect.
        assert_eq!(store.get(&created.id).unwrap(), created);
    }

    #[test]
    fn test_get_nonexistent() {
        let store = SessionStore::new();
        let err = store.get(&SessionId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_transition_nonexistent() {
        let store = SessionStore::new();
        let err = store
            .transition(&SessionId::new(), PaymentStatus::Success)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_transition_sets_updated_at() {
        let (store, clock) = store_with_clock();
        let created = store.create(amount(10.0)).unwrap();

        clock.advance(Duration::from_secs(5));
        let updated = store
            .transition(&created.id, PaymentStatus::Cancelled)
            .unwrap();

        assert_eq!(updated.status, PaymentStatus::Cancelled);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, Some(clock.now()));
    }

    #[test]
    fn test_terminal_status_is_final() {
        for first in [PaymentStatus::Success, PaymentStatus::Cancelled] {
            let store = SessionStore::new();
            let id = store.create(amount(10.0)).unwrap().id;
            store.transition(&id, first).unwrap();

            for again in [PaymentStatus::Success, PaymentStatus::Cancelled] {
                let err = store.transition(&id, again).unwrap_err();
                assert!(err.is_already_finalized());
            }
            assert_eq!(store.get(&id).unwrap().status, first);
        }
    }

    #[test]
    fn test_transition_to_pending_rejected() {
        let store = SessionStore::new();
        let id = store.create(amount(10.0)).unwrap().id;

        let err = store.transition(&id, PaymentStatus::Pending).unwrap_err();
        assert!(matches!(err, MockPayError::InvalidStateTransition { .. }));

        let session = store.get(&id).unwrap();
        assert_eq!(session.status, PaymentStatus::Pending);
        assert!(session.updated_at.is_none());
    }

    #[test]
    fn test_ttl_boundary() {
        let (store, clock) = store_with_clock();
        let id = store.create(amount(1000.0)).unwrap().id;
        let ttl = store.config().ttl;

        clock.advance(ttl - Duration::from_millis(1));
        assert!(store.get(&id).is_ok());

        clock.advance(Duration::from_millis(1));
        assert!(store.get(&id).is_ok(), "exactly TTL old is still live");

        clock.advance(Duration::from_millis(1));
        assert!(store.get(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_expired_get_evicts() {
        let (store, clock) = store_with_clock();
        let id = store.create(amount(1000.0)).unwrap().id;

        clock.advance(DEFAULT_SESSION_TTL + Duration::from_secs(1));
        assert_eq!(store.count(), 1);
        assert!(store.get(&id).is_err());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_expired_transition_not_found() {
        let (store, clock) = store_with_clock();
        let id = store.create(amount(1000.0)).unwrap().id;

        clock.advance(DEFAULT_SESSION_TTL + Duration::from_secs(1));
        let err = store
            .transition(&id, PaymentStatus::Cancelled)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_finalized_session_still_expires() {
        let (store, clock) = store_with_clock();
        let id = store.create(amount(1000.0)).unwrap().id;
        store.transition(&id, PaymentStatus::Success).unwrap();

        clock.advance(DEFAULT_SESSION_TTL + Duration::from_secs(1));
        assert!(store.get(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (store, clock) = store_with_clock();
        store.create(amount(1.0)).unwrap();
        store.create(amount(2.0)).unwrap();

        clock.advance(Duration::from_secs(5 * 60));
        let fresh = store.create(amount(3.0)).unwrap();

        clock.advance(Duration::from_secs(5 * 60 + 1));
        let removed = store.sweep().unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.count(), 1);
        assert_eq!(store.get(&fresh.id).unwrap().amount.value(), 3.0);
    }

    #[test]
    fn test_sweep_empty_store() {
        let store = SessionStore::new();
        assert_eq!(store.sweep().unwrap(), 0);
    }

    #[test]
    fn test_custom_ttl() {
        let clock = Arc::new(ManualClock::starting_now());
        let config = StoreConfig {
            ttl: Duration::from_secs(30),
            ..StoreConfig::default()
        };
        let store = SessionStore::with_clock(config, clock.clone());
        let id = store.create(amount(1.0)).unwrap().id;

        clock.advance(Duration::from_secs(31));
        assert!(store.get(&id).is_err());
    }

    #[test]
    fn test_concurrent_create() {
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let mut handles = vec![];

        for i in 0..100 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store.create(amount(f64::from(i) + 1.0)).unwrap().id
            }));
        }

        let ids: Vec<SessionId> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 100);
        assert_eq!(store.count(), 100);
    }

    #[test]
    fn test_concurrent_transitions_single_winner() {
        use std::sync::Barrier;
        use std::thread;

        for _ in 0..50 {
            let store = Arc::new(SessionStore::new());
            let id = store.create(amount(500.0)).unwrap().id;
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = [PaymentStatus::Success, PaymentStatus::Cancelled]
                .into_iter()
                .map(|target| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        (target, store.transition(&id, target))
                    })
                })
                .collect();

            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            let winners: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).collect();
            assert_eq!(winners.len(), 1);

            let loser = results.iter().find(|(_, r)| r.is_err()).unwrap();
            assert!(loser.1.as_ref().unwrap_err().is_already_finalized());

            assert_eq!(store.get(&id).unwrap().status, winners[0].0);
        }
    }

    #[test]
    fn test_count_survives_poisoned_lock() {
        let store = Arc::new(SessionStore::new());
        let id = store.create(amount(750.0)).unwrap().id;

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert_eq!(store.count(), 1);
        assert!(matches!(store.get(&id), Err(MockPayError::LockPoisoned)));
    }
}
