use chrono::{DateTime, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Wire representation of a record. Used for both push requests and pull
/// responses, and as the persisted body of the local row.
pub trait RecordPayload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The record's natural key.
    fn uuid(&self) -> RecordId;
}

/// A record that is created or edited locally and synchronized with the server.
///
/// Implementors carry a stable UUID, a [`SyncStatus`] and [`Timestamps`]. The
/// payload holds everything except the sync status, so
/// `from_payload(to_payload(r), r.sync_status())` reproduces `r`.
pub trait Synceable: Clone + Send + Sync + 'static {
    type Payload: RecordPayload;

    /// Name of the local table holding this record type.
    const TABLE: &'static str;

    fn uuid(&self) -> RecordId;

    fn sync_status(&self) -> SyncStatus;

    #[must_use]
    fn with_sync_status(self, sync_status: SyncStatus) -> Self;

    fn timestamps(&self) -> &Timestamps;

    #[must_use]
    fn with_timestamps(self, timestamps: Timestamps) -> Self;

    /// The patient this record belongs to, if any. Indexed locally.
    fn patient_uuid(&self) -> Option<RecordId> {
        None
    }

    fn to_payload(&self) -> Self::Payload;

    fn from_payload(payload: Self::Payload, sync_status: SyncStatus) -> Self;

    /// Marks a local edit made at `now`: bumps `updated_at` and resets the
    /// record to `Pending` so the next push uploads it.
    #[must_use]
    fn edited(self, now: DateTime<Utc>) -> Self {
        let timestamps = self.timestamps().touch(now);
        self.with_timestamps(timestamps)
            .with_sync_status(SyncStatus::Pending)
    }

    /// Soft-deletes the record at `now`. The deletion is pushed like any edit.
    #[must_use]
    fn deleted(self, now: DateTime<Utc>) -> Self {
        let timestamps = self.timestamps().delete(now);
        self.with_timestamps(timestamps)
            .with_sync_status(SyncStatus::Pending)
    }
}
