//! Core type definitions for the clinic sync engine.
//!
//! This crate defines the record-agnostic types shared by storage and sync:
//! - Record identifiers (UUID v4)
//! - The per-record `SyncStatus` lifecycle
//! - Creation/update/soft-delete `Timestamps`
//!
//! Domain records (blood pressures, call results, ...) live in `clinic-model`.

mod ids;
mod sync_status;
mod timestamps;

pub use ids::RecordId;
pub use sync_status::SyncStatus;
pub use timestamps::Timestamps;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid sync status: {0}")]
    InvalidSyncStatus(String),
}
