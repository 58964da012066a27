//! Runs every entity sync, grouped by cadence, with per-entity error isolation.

use crate::config::{DataSyncConfig, SyncGroup};
use crate::coordinator::run_blocking;
use crate::error::{ResolvedError, SyncResult};
use crate::model_sync::{ModelSync, SyncSummary};
use async_trait::async_trait;
use clinic_model::{
    Appointment, BloodPressureMeasurement, BloodSugarMeasurement, CallResult, Facility,
    MedicalHistory, PrescribedDrug, Protocol, QuestionnaireResponse,
};
use clinic_storage::{Database, Purgeable};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The logged-in user, as far as sync is concerned.
pub trait UserSession: Send + Sync {
    /// Whether any user is logged in on this device.
    fn is_user_present(&self) -> bool;

    /// Whether the logged-in user is approved to sync patient data.
    fn can_sync(&self) -> bool;
}

/// A fixed session, for tools and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticUserSession {
    pub user_present: bool,
    pub can_sync: bool,
}

impl StaticUserSession {
    pub const fn approved() -> Self {
        Self {
            user_present: true,
            can_sync: true,
        }
    }

    pub const fn logged_out() -> Self {
        Self {
            user_present: false,
            can_sync: false,
        }
    }
}

impl UserSession for StaticUserSession {
    fn is_user_present(&self) -> bool {
        self.user_present
    }

    fn can_sync(&self) -> bool {
        self.user_present && self.can_sync
    }
}

/// Cleanup run after a fully successful sync.
#[async_trait]
pub trait Purge: Send + Sync {
    async fn purge_unused_data(&self) -> SyncResult<usize>;
}

/// Deletes soft-deleted records the server already has.
pub struct PurgeOnSync {
    stores: Vec<Arc<dyn Purgeable>>,
}

impl PurgeOnSync {
    pub fn new(stores: Vec<Arc<dyn Purgeable>>) -> Self {
        Self { stores }
    }

    /// Purges every record table of `database`.
    pub fn for_database(database: &Database) -> SyncResult<Self> {
        let stores: Vec<Arc<dyn Purgeable>> = vec![
            Arc::new(database.repository::<BloodPressureMeasurement>()?),
            Arc::new(database.repository::<BloodSugarMeasurement>()?),
            Arc::new(database.repository::<PrescribedDrug>()?),
            Arc::new(database.repository::<Appointment>()?),
            Arc::new(database.repository::<MedicalHistory>()?),
            Arc::new(database.repository::<CallResult>()?),
            Arc::new(database.repository::<QuestionnaireResponse>()?),
            Arc::new(database.repository::<Facility>()?),
            Arc::new(database.repository::<Protocol>()?),
        ];
        Ok(Self::new(stores))
    }
}

#[async_trait]
impl Purge for PurgeOnSync {
    async fn purge_unused_data(&self) -> SyncResult<usize> {
        let stores = self.stores.clone();
        run_blocking(move || {
            let mut removed = 0;
            for store in &stores {
                removed += store.purge_deleted()?;
            }
            Ok(removed)
        })
        .await
    }
}

/// Where a group's sync is at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncProgress {
    Syncing,
    Success,
    Failure,
}

/// Progress event of one sync group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncGroupResult {
    pub group: SyncGroup,
    pub progress: SyncProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncSummary),
    Failed(ResolvedError),
}

impl SyncOutcome {
    pub const fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_))
    }
}

/// Result of one entity sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub name: String,
    pub group: SyncGroup,
    pub outcome: SyncOutcome,
}

/// Fan-out driver over every [`ModelSync`] of the client.
pub struct DataSync {
    syncs: Vec<Arc<dyn ModelSync>>,
    session: Arc<dyn UserSession>,
    purge: Option<Arc<dyn Purge>>,
    permits: Semaphore,
    progress: broadcast::Sender<SyncGroupResult>,
    errors: broadcast::Sender<ResolvedError>,
}

impl DataSync {
    pub fn new(
        syncs: Vec<Arc<dyn ModelSync>>,
        session: Arc<dyn UserSession>,
        config: DataSyncConfig,
    ) -> Self {
        let (progress, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (errors, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            syncs,
            session,
            purge: None,
            permits: Semaphore::new(config.max_parallel_syncs.max(1)),
            progress,
            errors,
        }
    }

    #[must_use]
    pub fn with_purge(mut self, purge: Arc<dyn Purge>) -> Self {
        self.purge = Some(purge);
        self
    }

    /// Progress events of every group sync started after this call.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<SyncGroupResult> {
        self.progress.subscribe()
    }

    /// The first error of every failed group sync.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<ResolvedError> {
        self.errors.subscribe()
    }

    /// Syncs every group. When all syncs completed and a user is logged in,
    /// purges data that is no longer needed.
    pub async fn sync_the_world(&self) -> Vec<SyncReport> {
        let groups = join_all(SyncGroup::ALL.into_iter().map(|group| self.sync(group))).await;
        let reports: Vec<SyncReport> = groups.into_iter().flatten().collect();

        let all_completed = reports.iter().all(|r| !r.outcome.is_failure());
        if all_completed && self.session.is_user_present() {
            if let Some(purge) = &self.purge {
                match purge.purge_unused_data().await {
                    Ok(removed) => debug!("Purged {} synced records", removed),
                    Err(e) => error!("Purge after sync failed: {}", e),
                }
            }
        }
        reports
    }

    /// Syncs the entities of one group. Syncs that need an approved user are
    /// skipped when there is none.
    pub async fn sync(&self, group: SyncGroup) -> Vec<SyncReport> {
        self.emit(group, SyncProgress::Syncing);

        let can_sync = self.session.can_sync();
        let runnable: Vec<Arc<dyn ModelSync>> = self
            .syncs
            .iter()
            .filter(|sync| sync.config().sync_group == group)
            .filter(|sync| {
                let allowed = can_sync || !sync.requires_sync_approved_user();
                if !allowed {
                    debug!("Skipping {} sync: no approved user", sync.name());
                }
                allowed
            })
            .cloned()
            .collect();

        let reports = join_all(runnable.into_iter().map(|sync| self.run(sync, group))).await;

        match reports.iter().find_map(|r| match r.outcome {
            SyncOutcome::Failed(err) => Some(err),
            SyncOutcome::Completed(_) => None,
        }) {
            Some(err) => {
                self.emit(group, SyncProgress::Failure);
                let _ = self.errors.send(err);
            }
            None => self.emit(group, SyncProgress::Success),
        }
        info!(
            "Sync group {} finished: {}/{} syncs completed",
            group,
            reports.iter().filter(|r| !r.outcome.is_failure()).count(),
            reports.len()
        );
        reports
    }

    /// Runs [`sync_the_world`](Self::sync_the_world) in the background.
    pub fn fire_and_forget_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let data_sync = Arc::clone(self);
        tokio::spawn(async move {
            data_sync.sync_the_world().await;
        })
    }

    /// Runs [`sync`](Self::sync) for one group in the background.
    pub fn fire_and_forget_sync_group(self: &Arc<Self>, group: SyncGroup) -> JoinHandle<()> {
        let data_sync = Arc::clone(self);
        tokio::spawn(async move {
            data_sync.sync(group).await;
        })
    }

    async fn run(&self, sync: Arc<dyn ModelSync>, group: SyncGroup) -> SyncReport {
        // The semaphore is never closed.
        let _permit = self.permits.acquire().await.ok();

        let outcome = match sync.sync().await {
            Ok(summary) => SyncOutcome::Completed(summary),
            Err(e) => {
                let resolved = e.resolve();
                if resolved.is_severe() {
                    error!("{} sync failed ({}): {}", sync.name(), resolved, e);
                } else {
                    warn!("{} sync failed ({}): {}", sync.name(), resolved, e);
                }
                SyncOutcome::Failed(resolved)
            }
        };

        SyncReport {
            name: sync.name().to_string(),
            group,
            outcome,
        }
    }

    fn emit(&self, group: SyncGroup, progress: SyncProgress) {
        let _ = self.progress.send(SyncGroupResult { group, progress });
    }
}
