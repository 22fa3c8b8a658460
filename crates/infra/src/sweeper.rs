//! Background expiry of stale invitations.
//!
//! The sweeper owns a tokio task that ticks on a fixed interval and runs
//! [`ExpireStaleInvitations`] through the unit of work on every tick. The
//! update is conditional on `PENDING` and `expires_at < now`, so overlapping
//! or repeated sweeps are harmless. Failures are logged and counted; the loop
//! keeps going until shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::ServiceError;
use crate::uow::{UnitOfWork, run_in_transaction};
use crate::use_cases::expiry::ExpireStaleInvitations;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SweeperError {
    #[error("sweep interval must be greater than zero")]
    ZeroInterval,
}

/// Sweeper runtime statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweeperStats {
    /// Completed sweeps, successful or not.
    pub runs: u64,
    pub expired_total: u64,
    pub failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    runs: AtomicU64,
    expired_total: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SweeperStats {
        // `runs` is bumped last, so reading it first never shows a run without its totals.
        let runs = self.runs.load(Ordering::Acquire);
        SweeperStats {
            runs,
            expired_total: self.expired_total.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Handle to control a running sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
    counters: Arc<Counters>,
}

impl SweeperHandle {
    /// Stop ticking and wait for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            warn!(error = %e, "expiry sweeper task ended abnormally");
        }
    }

    pub fn stats(&self) -> SweeperStats {
        self.counters.snapshot()
    }
}

pub struct ExpirySweeper;

impl ExpirySweeper {
    /// Expire every pending invitation whose deadline is before `now`.
    pub async fn expire_stale_invitations<U: UnitOfWork>(uow: &U, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        run_in_transaction(uow, ExpireStaleInvitations { now }).await
    }

    /// Run one sweep now.
    pub async fn sweep_once<U: UnitOfWork>(uow: &U) -> Result<u64, ServiceError> {
        Self::expire_stale_invitations(uow, Utc::now()).await
    }

    /// Spawn the sweeper on the current tokio runtime.
    ///
    /// The first sweep runs immediately, then once per `interval`. Ticks missed
    /// while a sweep was running are skipped, not replayed. A zero interval is
    /// refused.
    pub fn spawn<U>(uow: U, interval: Duration) -> Result<SweeperHandle, SweeperError>
    where
        U: UnitOfWork + 'static,
    {
        if interval.is_zero() {
            return Err(SweeperError::ZeroInterval);
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let counters = Arc::new(Counters::default());
        let task_counters = counters.clone();

        let join = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "expiry sweeper started");

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        match Self::sweep_once(&uow).await {
                            Ok(0) => debug!("no stale invitations"),
                            Ok(expired) => {
                                task_counters.expired_total.fetch_add(expired, Ordering::Relaxed);
                                info!(expired, "expired stale invitations");
                            }
                            Err(e) => {
                                task_counters.failures.fetch_add(1, Ordering::Relaxed);
                                error!(error = %e, kind = %e.kind(), "invitation expiry sweep failed");
                            }
                        }
                        task_counters.runs.fetch_add(1, Ordering::Release);
                    }
                }
            }

            info!("expiry sweeper stopped");
        });

        Ok(SweeperHandle {
            shutdown: shutdown_tx,
            join,
            counters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryDatabase;

    #[test]
    fn stats_serialize_as_flat_json() {
        let stats = SweeperStats {
            runs: 3,
            expired_total: 5,
            failures: 1,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json, serde_json::json!({"runs": 3, "expired_total": 5, "failures": 1}));
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop_and_releases_the_connection() {
        let db = InMemoryDatabase::new();
        let handle = ExpirySweeper::spawn(db.clone(), Duration::from_millis(5)).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let runs = handle.stats().runs;
        assert!(runs >= 1);
        assert_eq!(handle.stats().failures, 0);

        handle.shutdown().await;
        // Connection returned after the final sweep.
        assert_eq!(db.available_connections(), db.max_connections());
    }

    #[tokio::test]
    async fn zero_interval_is_refused() {
        let db = InMemoryDatabase::new();
        let err = ExpirySweeper::spawn(db.clone(), Duration::ZERO).unwrap_err();
        assert_eq!(err, SweeperError::ZeroInterval);
        assert_eq!(db.available_connections(), db.max_connections());
    }
}
