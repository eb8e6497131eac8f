use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::services::sync_service::SyncManager;

/// Periodic revalidation of the current week and the weeks right after it.
pub struct RefreshScheduler {
    sync: Arc<SyncManager>,
    interval: Duration,
    prefetch_weeks: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    pub refreshed: usize,
    pub failed: usize,
}

impl RefreshScheduler {
    pub fn new(sync: Arc<SyncManager>, interval: Duration, prefetch_weeks: usize) -> Self {
        Self {
            sync,
            interval,
            prefetch_weeks,
        }
    }

    /// Load the selected week once, then force-refresh on every tick.
    pub async fn start(self) {
        let week = self.sync.selected_week();
        if let Err(e) = self.sync.load(week, false).await {
            warn!("Initial schedule load for week {} failed: {}", week, e);
        }

        info!(
            "Starting schedule refresh scheduler (interval: {:?}, prefetch: {} weeks)",
            self.interval, self.prefetch_weeks
        );

        loop {
            tokio::time::sleep(self.interval).await;

            if let Some(stats) = self.run_refresh().await {
                info!(
                    "Schedule refresh completed - refreshed: {}, failed: {}",
                    stats.refreshed, stats.failed
                );
            }
        }
    }

    pub fn spawn(self) -> RefreshHandle {
        RefreshHandle {
            task: tokio::spawn(self.start()),
        }
    }

    /// One tick. Does nothing unless the user is looking at the current week.
    pub async fn run_refresh(&self) -> Option<RefreshStats> {
        let selected = self.sync.selected_week();
        let current = self.sync.current_week();
        if selected != current {
            debug!("Skipping refresh: week {} selected, current is {}", selected, current);
            return None;
        }

        let mut stats = RefreshStats::default();
        for week in self.sync.upcoming_weeks(self.prefetch_weeks.saturating_add(1)) {
            match self.sync.load(week, true).await {
                Ok(_) => stats.refreshed += 1,
                Err(e) => {
                    // Keep going, later weeks may still succeed.
                    warn!("Refresh of week {} failed: {}", week, e);
                    stats.failed += 1;
                }
            }
        }
        Some(stats)
    }
}

/// Owner of the running scheduler task; stopping or dropping it cancels the
/// timer.
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
