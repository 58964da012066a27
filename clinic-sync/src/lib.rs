//! Push/pull sync engine for clinic records.
//!
//! Keeps the local SQLite store and the sync server in agreement, one record
//! type at a time.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Coordinator**: batched push and paginated pull of one record type,
//!   owning the `SyncStatus` transitions
//! - **Api**: the server endpoints, behind the [`SyncApi`] trait, with an HTTP
//!   implementation
//! - **ModelSync**: one record type wired to its store, endpoint and pull token
//! - **DataSync**: runs every `ModelSync`, by group, isolating failures
//! - **Scheduler**: re-runs a group periodically with backoff
//!
//! ## Sync Process
//!
//! 1. **Push**: pending records go up in batches and come back `Done` or
//!    `Invalid`
//! 2. **Pull**: server changes come down page by page, resuming from the
//!    stored continuation token
//! 3. **Merge**: server copies replace local ones unless the local copy has
//!    unsynced edits
//!
//! # Example
//!
//! ```no_run
//! use clinic_storage::Database;
//! use clinic_sync::{all_syncs, ApiConfig, BatchSize, DataSync, DataSyncConfig, StaticUserSession};
//! use std::sync::Arc;
//!
//! # async fn run() -> clinic_sync::SyncResult<()> {
//! let database = Database::open("clinic.db")?;
//! let syncs = all_syncs(&database, &ApiConfig::default(), BatchSize::Medium)?;
//! let data_sync = DataSync::new(
//!     syncs,
//!     Arc::new(StaticUserSession::approved()),
//!     DataSyncConfig::default(),
//! );
//! let reports = data_sync.sync_the_world().await;
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
mod coordinator;
mod data_sync;
mod entities;
mod error;
mod model_sync;
pub mod protocol;
mod scheduler;

pub use api::{HttpSyncApi, SyncApi};
pub use config::{ApiConfig, BatchSize, DataSyncConfig, SyncConfig, SyncGroup, SyncInterval};
pub use coordinator::{PullSummary, PushSummary, Repository, SyncCoordinator};
pub use data_sync::{
    DataSync, Purge, PurgeOnSync, StaticUserSession, SyncGroupResult, SyncOutcome, SyncProgress,
    SyncReport, UserSession,
};
pub use entities::{
    SyncResource, all_syncs, appointment_sync, blood_pressure_sync, blood_sugar_sync,
    call_result_sync, facility_sync, medical_history_sync, prescription_sync, protocol_sync,
    questionnaire_response_sync,
};
pub use error::{ResolvedError, SyncError, SyncResult};
pub use model_sync::{EntitySync, ModelSync, SyncDirection, SyncSummary};
pub use protocol::{DataPullResponse, DataPushResponse, ValidationErrors};
pub use scheduler::SyncScheduler;
