//! Continuation tokens for incremental pulls.
//!
//! The server returns a `process_token` with every pull page. Sending it back
//! on the next pull resumes after the last record seen. A missing token means
//! "pull from the beginning".

use crate::database::lock;
use crate::error::StorageResult;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Arc, Mutex};

/// Key/value table of continuation tokens, one per synced resource.
#[derive(Clone)]
pub struct PullTokenStore {
    conn: Arc<Mutex<Connection>>,
}

impl PullTokenStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = lock(&self.conn)?;
        let token = conn
            .query_row(
                "SELECT token FROM pull_tokens WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(token)
    }

    pub fn set(&self, key: &str, token: &str) -> StorageResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT OR REPLACE INTO pull_tokens (key, token) VALUES (?1, ?2)",
            params![key, token],
        )?;
        Ok(())
    }

    pub fn clear(&self, key: &str) -> StorageResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute("DELETE FROM pull_tokens WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Forgets every token, forcing the next sync to pull everything.
    pub fn clear_all(&self) -> StorageResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute("DELETE FROM pull_tokens", [])?;
        Ok(())
    }

    /// Binds this store to a single resource key.
    pub fn token(&self, key: impl Into<String>) -> PullToken {
        PullToken {
            store: self.clone(),
            key: key.into(),
        }
    }
}

/// The continuation token of one resource.
#[derive(Clone)]
pub struct PullToken {
    store: PullTokenStore,
    key: String,
}

impl PullToken {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> StorageResult<Option<String>> {
        self.store.get(&self.key)
    }

    pub fn set(&self, token: &str) -> StorageResult<()> {
        self.store.set(&self.key, token)
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.store.clear(&self.key)
    }
}
