//! Per-record sync lifecycle.
//!
//! A record moves `Pending → InFlight → {Done | Invalid}` during a push.
//! Any local edit puts it back to `Pending`.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a local record has been durably accepted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Created or edited locally, waiting to be pushed.
    Pending,
    /// Part of a push batch whose response has not arrived yet.
    InFlight,
    /// Rejected by server-side validation. Not retried.
    Invalid,
    /// Matches the server copy.
    Done,
}

impl SyncStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [SyncStatus; 4] = [
        SyncStatus::Pending,
        SyncStatus::InFlight,
        SyncStatus::Invalid,
        SyncStatus::Done,
    ];

    /// The name stored in the local database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "PENDING",
            SyncStatus::InFlight => "IN_FLIGHT",
            SyncStatus::Invalid => "INVALID",
            SyncStatus::Done => "DONE",
        }
    }

    /// Returns true if a record in this state may be replaced by the server copy
    /// during a pull. Unsynced local edits always win.
    #[must_use]
    pub const fn can_be_overridden_by_server_copy(&self) -> bool {
        matches!(self, SyncStatus::Done | SyncStatus::Invalid)
    }

    /// Returns true if the record still has local changes the server has not seen.
    #[must_use]
    pub const fn is_unsynced(&self) -> bool {
        matches!(self, SyncStatus::Pending | SyncStatus::InFlight)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(SyncStatus::Pending),
            "IN_FLIGHT" => Ok(SyncStatus::InFlight),
            "INVALID" => Ok(SyncStatus::Invalid),
            "DONE" => Ok(SyncStatus::Done),
            other => Err(Error::InvalidSyncStatus(other.to_string())),
        }
    }
}
