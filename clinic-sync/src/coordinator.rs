//! Batched push and paginated pull for one record type.
//!
//! The coordinator owns the sync status transitions of a push:
//!
//! ```text
//! PENDING ──batch──▶ IN_FLIGHT ──accepted──▶ DONE
//!    ▲                   │ └────rejected───▶ INVALID
//!    └───request failed──┘
//! ```
//!
//! A pull writes the server's continuation token only after the page has been
//! merged, so an interrupted pull resumes from the last merged page.

use crate::api::SyncApi;
use crate::error::{SyncError, SyncResult};
use clinic_model::Synceable;
use clinic_storage::{PullToken, StorageResult, SynceableRepository};
use clinic_types::{RecordId, SyncStatus};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared handle to the local store of record type `R`.
pub type Repository<R> = Arc<dyn SynceableRepository<R, <R as Synceable>::Payload>>;

/// Totals of one push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    /// Round trips made.
    pub batches: usize,
    /// Records the server accepted.
    pub done: usize,
    /// Records the server rejected.
    pub invalid: usize,
}

/// Totals of one pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullSummary {
    /// Pages fetched.
    pub pages: usize,
    /// Server records written locally.
    pub applied: usize,
    /// Server records dropped in favour of unsynced local edits.
    pub skipped: usize,
}

/// Runs a storage call on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> SyncResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StorageResult<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

/// Drives push and pull between a [`SynceableRepository`] and a [`SyncApi`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncCoordinator;

impl SyncCoordinator {
    pub fn new() -> Self {
        Self
    }

    /// Pushes every pending record, `batch_size` records per request.
    ///
    /// Records the server names in its validation errors become `Invalid`,
    /// the rest of the batch becomes `Done`. If a request fails, its batch
    /// goes back to `Pending` and the error is returned.
    pub async fn push<R: Synceable>(
        &self,
        repository: &Repository<R>,
        batch_size: usize,
        api: &dyn SyncApi<R::Payload>,
    ) -> SyncResult<PushSummary> {
        if batch_size == 0 {
            return Err(SyncError::Config("push batch size must be positive".into()));
        }

        let repo = Arc::clone(repository);
        let recovered =
            run_blocking(move || repo.set_sync_status(SyncStatus::InFlight, SyncStatus::Pending))
                .await?;
        if recovered > 0 {
            warn!(
                "{}: {} records were left in flight by an interrupted push, retrying",
                R::TABLE,
                recovered
            );
        }

        let mut summary = PushSummary::default();
        loop {
            let repo = Arc::clone(repository);
            let batch = run_blocking(move || repo.pending_sync_records(batch_size, 0)).await?;
            if batch.is_empty() {
                break;
            }

            let ids: Vec<RecordId> = batch.iter().map(Synceable::uuid).collect();
            let repo = Arc::clone(repository);
            let marked = ids.clone();
            run_blocking(move || {
                repo.transition_sync_status(&marked, SyncStatus::Pending, SyncStatus::InFlight)
            })
            .await?;

            let payloads: Vec<R::Payload> = batch.iter().map(Synceable::to_payload).collect();
            let response = match api.push(&payloads).await {
                Ok(response) => response,
                Err(err) => {
                    self.revert_batch::<R>(repository, ids).await;
                    return Err(err);
                }
            };

            let sent: HashSet<RecordId> = ids.iter().copied().collect();
            let mut invalid = Vec::new();
            for errors in &response.validation_errors {
                if sent.contains(&errors.uuid) {
                    invalid.push(errors.uuid);
                } else {
                    warn!(
                        "{}: server reported validation errors for unknown record {}",
                        R::TABLE,
                        errors.uuid
                    );
                }
            }
            if !invalid.is_empty() {
                error!(
                    "{}: server rejected {} records: {:?}",
                    R::TABLE,
                    invalid.len(),
                    response.validation_errors
                );
            }

            let rejected: HashSet<RecordId> = invalid.iter().copied().collect();
            let accepted: Vec<RecordId> =
                ids.into_iter().filter(|id| !rejected.contains(id)).collect();

            let repo = Arc::clone(repository);
            let (invalid_count, done_count) = run_blocking(move || {
                let invalid_count = repo.transition_sync_status(
                    &invalid,
                    SyncStatus::InFlight,
                    SyncStatus::Invalid,
                )?;
                let done_count =
                    repo.transition_sync_status(&accepted, SyncStatus::InFlight, SyncStatus::Done)?;
                Ok((invalid_count, done_count))
            })
            .await?;

            summary.batches += 1;
            summary.done += done_count;
            summary.invalid += invalid_count;
            debug!(
                "{}: batch {} pushed ({} done, {} invalid)",
                R::TABLE,
                summary.batches,
                done_count,
                invalid_count
            );
        }

        if summary.batches > 0 {
            info!(
                "{}: pushed {} records in {} batches ({} invalid)",
                R::TABLE,
                summary.done + summary.invalid,
                summary.batches,
                summary.invalid
            );
        }
        Ok(summary)
    }

    async fn revert_batch<R: Synceable>(&self, repository: &Repository<R>, ids: Vec<RecordId>) {
        let repo = Arc::clone(repository);
        let reverted = run_blocking(move || {
            repo.transition_sync_status(&ids, SyncStatus::InFlight, SyncStatus::Pending)
        })
        .await;
        if let Err(e) = reverted {
            error!("{}: failed to return batch to pending: {}", R::TABLE, e);
        }
    }

    /// Pulls pages of `batch_size` records until the server returns a short
    /// page, merging each page and then storing its continuation token.
    pub async fn pull<R: Synceable>(
        &self,
        repository: &Repository<R>,
        token: &PullToken,
        batch_size: usize,
        api: &dyn SyncApi<R::Payload>,
    ) -> SyncResult<PullSummary> {
        if batch_size == 0 {
            return Err(SyncError::Config("pull batch size must be positive".into()));
        }

        let mut summary = PullSummary::default();
        loop {
            let stored = token.clone();
            let process_token = run_blocking(move || stored.get()).await?;

            let page = api.pull(batch_size, process_token.as_deref()).await?;
            let page_len = page.payloads.len();

            let repo = Arc::clone(repository);
            let outcome = run_blocking(move || repo.merge_with_local_data(page.payloads)).await?;

            let stored = token.clone();
            let next = page.process_token;
            run_blocking(move || stored.set(&next)).await?;

            summary.pages += 1;
            summary.applied += outcome.applied;
            summary.skipped += outcome.skipped;

            if page_len < batch_size {
                break;
            }
        }

        debug!(
            "{}: pulled {} pages ({} applied, {} skipped)",
            R::TABLE,
            summary.pages,
            summary.applied,
            summary.skipped
        );
        Ok(summary)
    }
}
