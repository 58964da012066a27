//! Configuration and commands of the `clinic-sync` client.

use anyhow::{Context, Result};
use clinic_model::{
    Appointment, BloodPressureMeasurement, BloodSugarMeasurement, CallResult, Facility,
    MedicalHistory, PrescribedDrug, Protocol, QuestionnaireResponse, Synceable,
};
use clinic_storage::{Database, StorageResult, SynceableRepository};
use clinic_sync::{
    ApiConfig, BatchSize, DataSync, DataSyncConfig, PurgeOnSync, StaticUserSession, SyncOutcome,
    SyncReport, all_syncs,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Client settings, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub database_path: PathBuf,
    pub api: ApiConfig,
    pub data_sync: DataSyncConfig,
    pub batch_size: BatchSize,
    /// Whether the logged-in user is approved to sync patient data.
    pub user_can_sync: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("clinic.db"),
            api: ApiConfig::default(),
            data_sync: DataSyncConfig::default(),
            batch_size: BatchSize::default(),
            user_can_sync: true,
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, database: Option<PathBuf>, server: Option<String>) -> Self {
        if let Some(database) = database {
            self.database_path = database;
        }
        if let Some(server) = server {
            self.api.base_url = server;
        }
        self
    }
}

/// Pending and total record counts of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStatus {
    pub name: &'static str,
    pub pending: usize,
    pub total: usize,
}

/// An opened database with the sync driver wired to it.
pub struct Client {
    pub database: Database,
    pub data_sync: Arc<DataSync>,
}

impl Client {
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let database = Database::open(&config.database_path).with_context(|| {
            format!("Failed to open database {}", config.database_path.display())
        })?;
        Self::with_database(database, config)
    }

    pub fn with_database(database: Database, config: &ClientConfig) -> Result<Self> {
        let syncs = all_syncs(&database, &config.api, config.batch_size)
            .context("Failed to set up entity syncs")?;
        let purge = PurgeOnSync::for_database(&database).context("Failed to set up purge")?;
        let session = StaticUserSession {
            user_present: true,
            can_sync: config.user_can_sync,
        };

        info!(
            "Syncing {} entities with {}",
            syncs.len(),
            config.api.base_url
        );
        let data_sync = DataSync::new(syncs, Arc::new(session), config.data_sync)
            .with_purge(Arc::new(purge));

        Ok(Self {
            database,
            data_sync: Arc::new(data_sync),
        })
    }

    pub fn status(&self) -> Result<Vec<EntityStatus>> {
        entity_status(&self.database).context("Failed to read record counts")
    }
}

fn count<R: Synceable>(database: &Database, name: &'static str) -> StorageResult<EntityStatus> {
    let store = database.repository::<R>()?;
    Ok(EntityStatus {
        name,
        pending: store.pending_sync_record_count()?,
        total: store.record_count()?,
    })
}

/// Record counts of every synced table.
pub fn entity_status(database: &Database) -> StorageResult<Vec<EntityStatus>> {
    Ok(vec![
        count::<Facility>(database, "facilities")?,
        count::<BloodPressureMeasurement>(database, "blood_pressures")?,
        count::<BloodSugarMeasurement>(database, "blood_sugars")?,
        count::<PrescribedDrug>(database, "prescription_drugs")?,
        count::<Appointment>(database, "appointments")?,
        count::<MedicalHistory>(database, "medical_histories")?,
        count::<CallResult>(database, "call_results")?,
        count::<QuestionnaireResponse>(database, "questionnaire_responses")?,
        count::<Protocol>(database, "protocols")?,
    ])
}

pub fn format_status(status: &[EntityStatus]) -> String {
    let mut out = format!("{:<26}{:>9}{:>9}\n", "ENTITY", "PENDING", "TOTAL");
    for entity in status {
        let _ = writeln!(
            out,
            "{:<26}{:>9}{:>9}",
            entity.name, entity.pending, entity.total
        );
    }
    out
}

pub fn format_reports(reports: &[SyncReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = match report.outcome {
            SyncOutcome::Completed(summary) => writeln!(
                out,
                "{:<26}{:<10}ok  pushed {} ({} invalid), pulled {}",
                report.name,
                report.group,
                summary.push.done + summary.push.invalid,
                summary.push.invalid,
                summary.pull.applied
            ),
            SyncOutcome::Failed(err) => writeln!(
                out,
                "{:<26}{:<10}FAILED: {}",
                report.name, report.group, err
            ),
        };
    }
    out
}

/// Whether any sync in `reports` failed.
pub fn any_failed(reports: &[SyncReport]) -> bool {
    reports.iter().any(|r| r.outcome.is_failure())
}
