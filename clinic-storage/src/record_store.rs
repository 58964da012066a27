//! Generic SQLite table for one [`Synceable`] record type.
//!
//! Each row keeps the JSON payload as the source of truth. `sync_status`,
//! `patient_uuid` and the timestamps are copied into columns so the sync
//! queries can filter and order without decoding payloads.

use crate::database::lock;
use crate::error::{StorageError, StorageResult};
use crate::repository::{MergeOutcome, Purgeable, SynceableRepository};
use chrono::{DateTime, SecondsFormat, Utc};
use clinic_model::Synceable;
use clinic_types::{RecordId, SyncStatus};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// SQLite-backed [`SynceableRepository`] for record type `R`.
pub struct RecordStore<R> {
    conn: Arc<Mutex<Connection>>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            _record: PhantomData,
        }
    }
}

impl<R: Synceable> RecordStore<R> {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> StorageResult<Self> {
        let store = Self {
            conn,
            _record: PhantomData,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = lock(&self.conn)?;
        let table = R::TABLE;
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                uuid TEXT PRIMARY KEY,
                sync_status TEXT NOT NULL,
                patient_uuid TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_sync_status ON {table}(sync_status);
            CREATE INDEX IF NOT EXISTS idx_{table}_patient ON {table}(patient_uuid);
            "
        ))?;
        Ok(())
    }

    /// Records belonging to `patient`, newest first. Soft-deleted rows are excluded.
    pub fn records_for_patient(&self, patient: RecordId) -> StorageResult<Vec<R>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT payload, sync_status FROM {} WHERE patient_uuid = ?1 AND deleted_at IS NULL ORDER BY created_at DESC, uuid",
            R::TABLE
        ))?;
        let rows = stmt.query_map(params![patient.to_string()], read_row)?;
        collect_records(rows)
    }

    /// Removes every row of this record type.
    pub fn clear(&self) -> StorageResult<usize> {
        let conn = lock(&self.conn)?;
        let removed = conn.execute(&format!("DELETE FROM {}", R::TABLE), [])?;
        Ok(removed)
    }

    fn count_where(&self, clause: &str, status: Option<SyncStatus>) -> StorageResult<usize> {
        let conn = lock(&self.conn)?;
        let sql = format!("SELECT COUNT(*) FROM {} {clause}", R::TABLE);
        let count: i64 = match status {
            Some(status) => conn.query_row(&sql, params![status.as_str()], |row| row.get(0))?,
            None => conn.query_row(&sql, [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }
}

impl<R: Synceable> SynceableRepository<R, R::Payload> for RecordStore<R> {
    fn save(&self, records: &[R]) -> StorageResult<()> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        for record in records {
            upsert(&tx, record)?;
        }
        tx.commit()?;
        trace!("Saved {} {} records", records.len(), R::TABLE);
        Ok(())
    }

    fn set_sync_status(&self, from: SyncStatus, to: SyncStatus) -> StorageResult<usize> {
        let conn = lock(&self.conn)?;
        let updated = conn.execute(
            &format!("UPDATE {} SET sync_status = ?1 WHERE sync_status = ?2", R::TABLE),
            params![to.as_str(), from.as_str()],
        )?;
        if updated > 0 {
            debug!("{}: moved {} records {} -> {}", R::TABLE, updated, from, to);
        }
        Ok(updated)
    }

    fn set_sync_status_for_ids(&self, ids: &[RecordId], to: SyncStatus) -> StorageResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = lock(&self.conn)?;
        let sql = format!(
            "UPDATE {} SET sync_status = ? WHERE uuid IN ({})",
            R::TABLE,
            placeholders(ids.len())
        );
        let values = std::iter::once(to.as_str().to_string()).chain(ids.iter().map(RecordId::to_string));
        Ok(conn.execute(&sql, params_from_iter(values))?)
    }

    fn transition_sync_status(
        &self,
        ids: &[RecordId],
        from: SyncStatus,
        to: SyncStatus,
    ) -> StorageResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = lock(&self.conn)?;
        let sql = format!(
            "UPDATE {} SET sync_status = ? WHERE sync_status = ? AND uuid IN ({})",
            R::TABLE,
            placeholders(ids.len())
        );
        let values = [to.as_str().to_string(), from.as_str().to_string()]
            .into_iter()
            .chain(ids.iter().map(RecordId::to_string));
        Ok(conn.execute(&sql, params_from_iter(values))?)
    }

    fn merge_with_local_data(&self, payloads: Vec<R::Payload>) -> StorageResult<MergeOutcome> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let mut outcome = MergeOutcome::default();
        {
            let mut status_of = tx.prepare(&format!(
                "SELECT sync_status FROM {} WHERE uuid = ?1",
                R::TABLE
            ))?;
            for payload in payloads {
                let record = R::from_payload(payload, SyncStatus::Done);
                let local: Option<String> = status_of
                    .query_row(params![record.uuid().to_string()], |row| row.get(0))
                    .optional()?;
                let local_wins = match local {
                    Some(status) => !status.parse::<SyncStatus>()?.can_be_overridden_by_server_copy(),
                    None => false,
                };
                if local_wins {
                    trace!("{}: keeping unsynced local copy of {}", R::TABLE, record.uuid());
                    outcome.skipped += 1;
                } else {
                    upsert(&tx, &record)?;
                    outcome.applied += 1;
                }
            }
        }
        tx.commit()?;
        debug!(
            "{}: merged {} server records, skipped {}",
            R::TABLE,
            outcome.applied,
            outcome.skipped
        );
        Ok(outcome)
    }

    fn pending_sync_records(&self, limit: usize, offset: usize) -> StorageResult<Vec<R>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT payload, sync_status FROM {} WHERE sync_status = ?1 ORDER BY created_at, uuid LIMIT ?2 OFFSET ?3",
            R::TABLE
        ))?;
        let rows = stmt.query_map(
            params![SyncStatus::Pending.as_str(), limit as i64, offset as i64],
            read_row,
        )?;
        collect_records(rows)
    }

    fn pending_sync_record_count(&self) -> StorageResult<usize> {
        self.count_where("WHERE sync_status = ?1", Some(SyncStatus::Pending))
    }

    fn record_count(&self) -> StorageResult<usize> {
        self.count_where("", None)
    }

    fn records_with_sync_status(&self, status: SyncStatus) -> StorageResult<Vec<R>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT payload, sync_status FROM {} WHERE sync_status = ?1 ORDER BY created_at, uuid",
            R::TABLE
        ))?;
        let rows = stmt.query_map(params![status.as_str()], read_row)?;
        collect_records(rows)
    }

    fn record(&self, id: RecordId) -> StorageResult<Option<R>> {
        let conn = lock(&self.conn)?;
        let row = conn
            .query_row(
                &format!("SELECT payload, sync_status FROM {} WHERE uuid = ?1", R::TABLE),
                params![id.to_string()],
                read_row,
            )
            .optional()?;
        row.map(decode::<R>).transpose()
    }
}

impl<R: Synceable> Purgeable for RecordStore<R> {
    fn purge_deleted(&self) -> StorageResult<usize> {
        let conn = lock(&self.conn)?;
        let removed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE deleted_at IS NOT NULL AND sync_status = ?1",
                R::TABLE
            ),
            params![SyncStatus::Done.as_str()],
        )?;
        if removed > 0 {
            debug!("{}: purged {} deleted records", R::TABLE, removed);
        }
        Ok(removed)
    }
}

fn upsert<R: Synceable>(conn: &Connection, record: &R) -> StorageResult<()> {
    let timestamps = record.timestamps();
    let payload = serde_json::to_string(&record.to_payload())?;
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO {} (uuid, sync_status, patient_uuid, created_at, updated_at, deleted_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            R::TABLE
        ),
        params![
            record.uuid().to_string(),
            record.sync_status().as_str(),
            record.patient_uuid().map(|p| p.to_string()),
            format_time(timestamps.created_at),
            format_time(timestamps.updated_at),
            timestamps.deleted_at.map(format_time),
            payload,
        ],
    )?;
    Ok(())
}

/// Fixed-width UTC timestamps, so text ordering matches time ordering.
fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn decode<R: Synceable>((payload, status): (String, String)) -> StorageResult<R> {
    let status: SyncStatus = status.parse()?;
    let payload: R::Payload = serde_json::from_str(&payload).map_err(|e| {
        StorageError::InvalidData(format!("corrupt {} payload: {e}", R::TABLE))
    })?;
    Ok(R::from_payload(payload, status))
}

fn collect_records<R: Synceable>(
    rows: impl Iterator<Item = rusqlite::Result<(String, String)>>,
) -> StorageResult<Vec<R>> {
    rows.map(|row| decode(row?)).collect()
}
