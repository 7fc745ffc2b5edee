//! Periodic cleanup of stale thread records and expired cached invites.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cache::InviteCache;
use crate::database::ThreadInviteRepository;
use crate::error::PersistenceError;

/// When the sweep runs.
#[derive(Debug, Clone, Copy)]
pub struct CleanupSchedule {
    /// Wait before the first cycle.
    pub startup_delay: Duration,
    /// Wait between cycles, including after a failed one.
    pub period: Duration,
}

impl Default for CleanupSchedule {
    fn default() -> Self {
        Self {
            startup_delay: Duration::ZERO,
            period: Duration::from_secs(3600),
        }
    }
}

/// Outcome of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub records_deleted: u64,
    pub cache_evicted: usize,
}

#[derive(Clone)]
pub struct CleanupSweeper {
    records: ThreadInviteRepository,
    cache: InviteCache,
    retention: chrono::Duration,
}

impl CleanupSweeper {
    pub fn new(records: ThreadInviteRepository, cache: InviteCache, retention: chrono::Duration) -> Self {
        Self {
            records,
            cache,
            retention,
        }
    }

    /// Run one cycle now.
    pub async fn run_cycle(&self) -> Result<SweepReport, PersistenceError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Cached invites are evicted even when the record cleanup fails.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<SweepReport, PersistenceError> {
        let cache_evicted = self.cache.evict_expired_at(now);
        if cache_evicted > 0 {
            debug!("Cleaned up {} expired cache entries", cache_evicted);
        }

        // No record can predate a cutoff before the representable range.
        let records_deleted = match now.checked_sub_signed(self.retention) {
            Some(cutoff) => self.records.delete_older_than(cutoff).await?,
            None => 0,
        };
        if records_deleted > 0 {
            info!("Cleaned up {} expired thread records", records_deleted);
        }

        Ok(SweepReport {
            records_deleted,
            cache_evicted,
        })
    }
}

/// Owned handle to the background sweep.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweep at its next sleep boundary and wait for it to exit.
    /// A cycle in progress is allowed to finish.
    pub async fn cancel(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Cleanup sweeper ended abnormally: {}", e);
        }
    }
}

/// Start the sweep loop on the runtime.
pub fn spawn(sweeper: CleanupSweeper, schedule: CleanupSchedule) -> SweeperHandle {
    let (shutdown, mut cancelled) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!(
            "Cleanup sweeper running every {}s (first run in {}s)",
            schedule.period.as_secs(),
            schedule.startup_delay.as_secs()
        );

        tokio::select! {
            _ = sleep(schedule.startup_delay) => {}
            _ = cancelled.changed() => {
                info!("Cleanup sweeper stopped before first run");
                return;
            }
        }

        loop {
            if let Err(e) = sweeper.run_cycle().await {
                error!("Error in periodic cleanup: {}", e);
            }

            tokio::select! {
                _ = sleep(schedule.period) => {}
                _ = cancelled.changed() => break,
            }
        }

        info!("Cleanup sweeper stopped");
    });

    SweeperHandle { shutdown, task }
}
