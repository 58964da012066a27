//! Creation, modification and soft-delete times shared by every record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record timestamps. Records are never hard-deleted locally until the
/// deletion has been synced; `deleted_at` marks a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Timestamps for a record created at `now`.
    #[must_use]
    pub const fn create(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Marks the record as modified at `now`.
    #[must_use]
    pub fn touch(self, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now.max(self.updated_at),
            ..self
        }
    }

    /// Soft-deletes the record at `now`.
    #[must_use]
    pub fn delete(self, now: DateTime<Utc>) -> Self {
        let touched = self.touch(now);
        Self {
            deleted_at: Some(touched.updated_at),
            ..touched
        }
    }

    /// Returns true if the record has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
