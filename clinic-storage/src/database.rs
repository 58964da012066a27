//! Connection handling and schema migrations.

use crate::error::{StorageError, StorageResult};
use crate::pull_token::PullTokenStore;
use crate::record_store::RecordStore;
use clinic_model::Synceable;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Schema migrations, applied in order. `PRAGMA user_version` holds the
/// number of migrations already applied.
const MIGRATIONS: &[&str] = &[
    "
    CREATE TABLE IF NOT EXISTS pull_tokens (
        key TEXT PRIMARY KEY,
        token TEXT NOT NULL
    );
    ",
];

/// The local relational store. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("Opened clinic database at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let applied = user_version(&conn)?;

        if applied > MIGRATIONS.len() {
            return Err(StorageError::Migration(format!(
                "database schema version {applied} is newer than supported version {}",
                MIGRATIONS.len()
            )));
        }

        for (index, sql) in MIGRATIONS.iter().enumerate().skip(applied) {
            let version = index + 1;
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| StorageError::Migration(format!("migration {version} failed: {e}")))?;
            tx.pragma_update(None, "user_version", version as i64)?;
            tx.commit()?;
            debug!("Applied schema migration {}", version);
        }
        Ok(())
    }

    /// Returns the current schema version.
    pub fn schema_version(&self) -> StorageResult<usize> {
        user_version(&*self.lock()?)
    }

    /// Returns the repository for record type `R`, creating its table if needed.
    pub fn repository<R: Synceable>(&self) -> StorageResult<RecordStore<R>> {
        RecordStore::new(Arc::clone(&self.conn))
    }

    /// Returns the continuation token store.
    pub fn pull_tokens(&self) -> PullTokenStore {
        PullTokenStore::new(Arc::clone(&self.conn))
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        lock(&self.conn)
    }
}

fn user_version(conn: &Connection) -> StorageResult<usize> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    usize::try_from(version)
        .map_err(|_| StorageError::Migration(format!("negative schema version {version}")))
}

pub(crate) fn lock(conn: &Mutex<Connection>) -> StorageResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| StorageError::LockPoisoned)
}
