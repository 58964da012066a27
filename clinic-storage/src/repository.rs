//! The storage interface driven by the sync coordinator.

use crate::error::StorageResult;
use clinic_types::{RecordId, SyncStatus};

/// Result of merging a page of server records into the local table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Server copies written locally (inserted or replaced).
    pub applied: usize,
    /// Server copies dropped because the local copy has unsynced changes.
    pub skipped: usize,
}

/// Storage operations needed to sync one record type.
///
/// `T` is the local record, `P` its wire payload.
pub trait SynceableRepository<T, P>: Send + Sync {
    /// Inserts or replaces records, keyed by UUID.
    fn save(&self, records: &[T]) -> StorageResult<()>;

    /// Moves every record currently in `from` to `to`.
    fn set_sync_status(&self, from: SyncStatus, to: SyncStatus) -> StorageResult<usize>;

    /// Sets the status of the given records, whatever their current status.
    /// An empty id list is a no-op.
    fn set_sync_status_for_ids(&self, ids: &[RecordId], to: SyncStatus) -> StorageResult<usize>;

    /// Moves the given records to `to`, but only those still in `from`.
    /// Records edited in the meantime keep their new status.
    fn transition_sync_status(
        &self,
        ids: &[RecordId],
        from: SyncStatus,
        to: SyncStatus,
    ) -> StorageResult<usize>;

    /// Applies server payloads as `Done` records. A local copy that is
    /// `Pending` or `InFlight` wins and the server copy is skipped.
    fn merge_with_local_data(&self, payloads: Vec<P>) -> StorageResult<MergeOutcome>;

    /// `Pending` records, oldest first, for batched pushing.
    fn pending_sync_records(&self, limit: usize, offset: usize) -> StorageResult<Vec<T>>;

    fn pending_sync_record_count(&self) -> StorageResult<usize>;

    fn record_count(&self) -> StorageResult<usize>;

    fn records_with_sync_status(&self, status: SyncStatus) -> StorageResult<Vec<T>>;

    fn record(&self, id: RecordId) -> StorageResult<Option<T>>;
}

/// Data that can be cleaned up once it is fully synced.
pub trait Purgeable: Send + Sync {
    /// Removes soft-deleted records the server already knows about.
    /// Returns the number of rows removed.
    fn purge_deleted(&self) -> StorageResult<usize>;
}
