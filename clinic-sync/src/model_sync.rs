//! Per-entity sync.

use crate::api::SyncApi;
use crate::config::SyncConfig;
use crate::coordinator::{PullSummary, PushSummary, Repository, SyncCoordinator};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use clinic_model::Synceable;
use clinic_storage::PullToken;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Totals of a full push-then-pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub push: PushSummary,
    pub pull: PullSummary,
}

/// Sync of one record type with the server.
#[async_trait]
pub trait ModelSync: Send + Sync {
    fn name(&self) -> &str;

    fn config(&self) -> &SyncConfig;

    /// Whether the sync only runs for a logged-in user approved to sync.
    fn requires_sync_approved_user(&self) -> bool {
        true
    }

    async fn push(&self) -> SyncResult<PushSummary>;

    async fn pull(&self) -> SyncResult<PullSummary>;

    /// Pushes, then pulls. A failed push does not stop the pull; if both
    /// fail, both errors are returned.
    async fn sync(&self) -> SyncResult<SyncSummary> {
        let push = self.push().await;
        let pull = self.pull().await;
        match (push, pull) {
            (Ok(push), Ok(pull)) => Ok(SyncSummary { push, pull }),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(push), Err(pull)) => Err(SyncError::Multiple(vec![push, pull])),
        }
    }
}

/// Whether local changes of an entity are uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    PushAndPull,
    /// Server-owned data. Push is a no-op.
    PullOnly,
}

/// [`ModelSync`] for any [`Synceable`] record type.
///
/// Only one push or pull of a record type runs at a time. An overlapping
/// call (a scheduled sync racing a manual one) waits for the running one, so
/// a push never reconciles records another push put in flight.
pub struct EntitySync<R: Synceable> {
    coordinator: SyncCoordinator,
    repository: Repository<R>,
    api: Arc<dyn SyncApi<R::Payload>>,
    token: PullToken,
    config: SyncConfig,
    direction: SyncDirection,
    requires_approved_user: bool,
    running: Mutex<()>,
}

impl<R: Synceable> EntitySync<R> {
    pub fn new(
        repository: Repository<R>,
        api: Arc<dyn SyncApi<R::Payload>>,
        token: PullToken,
        config: SyncConfig,
    ) -> Self {
        Self {
            coordinator: SyncCoordinator::new(),
            repository,
            api,
            token,
            config,
            direction: SyncDirection::PushAndPull,
            requires_approved_user: true,
            running: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: SyncDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_requires_approved_user(mut self, required: bool) -> Self {
        self.requires_approved_user = required;
        self
    }

    pub fn direction(&self) -> SyncDirection {
        self.direction
    }

    pub fn repository(&self) -> &Repository<R> {
        &self.repository
    }
}

#[async_trait]
impl<R: Synceable> ModelSync for EntitySync<R> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn requires_sync_approved_user(&self) -> bool {
        self.requires_approved_user
    }

    async fn push(&self) -> SyncResult<PushSummary> {
        if self.direction == SyncDirection::PullOnly {
            return Ok(PushSummary::default());
        }
        let _running = self.running.lock().await;
        self.coordinator
            .push(&self.repository, self.config.push_batch_size, self.api.as_ref())
            .await
    }

    async fn pull(&self) -> SyncResult<PullSummary> {
        let _running = self.running.lock().await;
        self.coordinator
            .pull(
                &self.repository,
                &self.token,
                self.config.pull_batch_size,
                self.api.as_ref(),
            )
            .await
    }
}
