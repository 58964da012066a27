//! SQLite storage layer for synceable clinic records.
//!
//! Provides the local half of sync: one table per record type, sync status
//! bookkeeping, and the continuation tokens of each pull.
//!
//! # Architecture
//!
//! - Records are stored as their JSON wire payload, with the sync status, the
//!   owning patient and the timestamps extracted into columns
//! - [`SynceableRepository`] is the interface the sync coordinator drives;
//!   [`RecordStore`] implements it for any [`clinic_model::Synceable`] type
//! - [`PullTokenStore`] persists the last `process_token` per resource
//! - Schema migrations run automatically when the database is opened

mod database;
mod error;
mod pull_token;
mod record_store;
mod repository;

pub use database::Database;
pub use error::{StorageError, StorageResult};
pub use pull_token::{PullToken, PullTokenStore};
pub use record_store::RecordStore;
pub use repository::{MergeOutcome, Purgeable, SynceableRepository};
