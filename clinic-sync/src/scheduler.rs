//! Periodic background sync of one group.

use crate::config::{SyncGroup, SyncInterval};
use crate::data_sync::DataSync;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Runs a group every `frequency`, backing off after failures.
pub struct SyncScheduler {
    data_sync: Arc<DataSync>,
    group: SyncGroup,
    interval: SyncInterval,
}

impl SyncScheduler {
    pub fn new(data_sync: Arc<DataSync>, group: SyncGroup) -> Self {
        Self {
            data_sync,
            group,
            interval: group.interval(),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: SyncInterval) -> Self {
        self.interval = interval;
        self
    }

    /// Delay before the next attempt after `consecutive_failures` failed runs.
    /// Doubles from `backoff_delay` and never exceeds `frequency`.
    pub fn retry_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.interval.frequency;
        }
        let factor = 2u32.saturating_pow(consecutive_failures - 1);
        self.interval
            .backoff_delay
            .saturating_mul(factor)
            .min(self.interval.frequency)
    }

    /// Runs until `shutdown` becomes true or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Scheduling {} sync every {:?}",
            self.group, self.interval.frequency
        );
        let mut failures = 0u32;
        loop {
            if *shutdown.borrow() {
                break;
            }

            let reports = self.data_sync.sync(self.group).await;
            if reports.iter().any(|r| r.outcome.is_failure()) {
                failures = failures.saturating_add(1);
                warn!(
                    "{} sync failed {} time(s) in a row, retrying in {:?}",
                    self.group,
                    failures,
                    self.retry_delay(failures)
                );
            } else {
                failures = 0;
            }

            let delay = self.retry_delay(failures);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("{} sync scheduler stopped", self.group);
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
