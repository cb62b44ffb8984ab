//! Background eviction of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::SessionStore;

/// Shortest period the sweeper will tick at.
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Longest period the sweeper will tick at.
pub const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn a task that sweeps the store every `sweep_interval`.
///
/// The interval is clamped to [`MIN_SWEEP_PERIOD`]..=[`MAX_SWEEP_PERIOD`].
/// The task runs until the returned handle is aborted. Reads and transitions
/// check expiry themselves; this only bounds memory held by abandoned
/// sessions.
pub fn spawn_sweeper(store: Arc<SessionStore>) -> JoinHandle<()> {
    let configured = store.config().sweep_interval;
    let period = configured.clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD);
    if period != configured {
        tracing::warn!(
            configured_ms = configured.as_millis() as u64,
            period_ms = period.as_millis() as u64,
            "sweep interval out of range, clamped"
        );
    }

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store.sweep() {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::info!(
                        removed,
                        remaining = store.count(),
                        "expired sessions swept"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "session sweep failed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::session::{Amount, ManualClock, StoreConfig};

    fn store_every(clock: Arc<ManualClock>, sweep_interval: Duration) -> Arc<SessionStore> {
        let config = StoreConfig {
            ttl: Duration::from_secs(600),
            sweep_interval,
        };
        Arc::new(SessionStore::with_clock(config, clock))
    }

    fn store(clock: Arc<ManualClock>) -> Arc<SessionStore> {
        store_every(clock, Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_expired_sessions() {
        let clock = Arc::new(ManualClock::starting_now());
        let store = store(clock.clone());
        store.create(Amount::new(1000.0).unwrap()).unwrap();
        store.create(Amount::new(2000.0).unwrap()).unwrap();

        let handle = spawn_sweeper(Arc::clone(&store));

        clock.advance(Duration::from_secs(601));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(store.count(), 0);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_keeps_live_sessions() {
        let clock = Arc::new(ManualClock::starting_now());
        let store = store(clock.clone());
        let session = store.create(Amount::new(1000.0).unwrap()).unwrap();

        let handle = spawn_sweeper(Arc::clone(&store));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(store.count(), 1);
        assert!(store.get(&session.id).is_ok());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_abort() {
        let store = Arc::new(SessionStore::new());
        let handle = spawn_sweeper(store);
        handle.abort();
        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_clamped_to_minimum() {
        let clock = Arc::new(ManualClock::starting_now());
        let store = store_every(clock.clone(), Duration::ZERO);
        store.create(Amount::new(1000.0).unwrap()).unwrap();

        let handle = spawn_sweeper(Arc::clone(&store));
        clock.advance(Duration::from_secs(601));
        tokio::time::sleep(MIN_SWEEP_PERIOD * 2).await;

        assert_eq!(store.count(), 0);
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_does_not_kill_task() {
        let clock = Arc::new(ManualClock::starting_now());
        let store = store_every(clock.clone(), Duration::MAX);
        store.create(Amount::new(1000.0).unwrap()).unwrap();

        let handle = spawn_sweeper(Arc::clone(&store));
        clock.advance(Duration::from_secs(601));
        tokio::time::sleep(MAX_SWEEP_PERIOD + Duration::from_secs(1)).await;

        assert!(!handle.is_finished());
        assert_eq!(store.count(), 0);
        handle.abort();
    }
}
