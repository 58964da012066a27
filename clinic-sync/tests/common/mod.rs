#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use clinic_model::{BloodPressureMeasurement, BloodPressureReading, RecordPayload};
use clinic_storage::{Database, PullToken};
use clinic_sync::{
    DataPullResponse, DataPushResponse, Repository, SyncApi, SyncError, SyncResult,
    ValidationErrors,
};
use clinic_types::RecordId;
use serde_json::Map;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

/// A pending blood pressure created `minutes` after `t0`.
pub fn bp(minutes: i64) -> BloodPressureMeasurement {
    BloodPressureMeasurement::record(
        BloodPressureReading::new(140, 90),
        RecordId::new(),
        RecordId::new(),
        RecordId::new(),
        t0() + Duration::minutes(minutes),
    )
}

pub fn bps(count: i64) -> Vec<BloodPressureMeasurement> {
    (0..count).map(bp).collect()
}

pub struct Store {
    pub db: Database,
    pub repo: Repository<BloodPressureMeasurement>,
    pub token: PullToken,
}

pub fn store() -> Store {
    let db = Database::open_in_memory().unwrap();
    let repo: Repository<BloodPressureMeasurement> =
        Arc::new(db.repository::<BloodPressureMeasurement>().unwrap());
    let token = db.pull_tokens().token("last_bp_pull_token");
    Store { db, repo, token }
}

pub fn validation_error(id: RecordId) -> ValidationErrors {
    ValidationErrors {
        uuid: id,
        schema: vec!["id is invalid".to_string()],
        fields: Map::new(),
    }
}

type PushHook = Box<dyn FnOnce() + Send>;

/// Holds a push request open until released.
#[derive(Clone, Default)]
pub struct PushGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// In-memory sync server for one resource.
///
/// Pull tokens are offsets into `server_records`.
pub struct FakeApi<P> {
    pub pushed: Mutex<Vec<Vec<P>>>,
    pub pulls: Mutex<Vec<(usize, Option<String>)>>,
    pub server_records: Mutex<Vec<P>>,
    pub reject: Mutex<Vec<RecordId>>,
    pub push_fails: AtomicBool,
    pub pull_fails: AtomicBool,
    before_push_returns: Mutex<Option<PushHook>>,
    gate: Mutex<Option<PushGate>>,
}

impl<P: RecordPayload> FakeApi<P> {
    pub fn new() -> Arc<Self> {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<P>) -> Arc<Self> {
        Arc::new(Self {
            pushed: Mutex::new(Vec::new()),
            pulls: Mutex::new(Vec::new()),
            server_records: Mutex::new(records),
            reject: Mutex::new(Vec::new()),
            push_fails: AtomicBool::new(false),
            pull_fails: AtomicBool::new(false),
            before_push_returns: Mutex::new(None),
            gate: Mutex::new(None),
        })
    }

    pub fn reject(&self, ids: &[RecordId]) {
        self.reject.lock().unwrap().extend_from_slice(ids);
    }

    pub fn fail_push(&self, fail: bool) {
        self.push_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pull(&self, fail: bool) {
        self.pull_fails.store(fail, Ordering::SeqCst);
    }

    /// Runs `hook` while the first push request is "on the wire".
    pub fn during_push(&self, hook: impl FnOnce() + Send + 'static) {
        *self.before_push_returns.lock().unwrap() = Some(Box::new(hook));
    }

    /// Makes the next push wait for `release` after signalling `entered`.
    pub fn hold_next_push(&self) -> PushGate {
        let gate = PushGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn push_batch_sizes(&self) -> Vec<usize> {
        self.pushed.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn pull_count(&self) -> usize {
        self.pulls.lock().unwrap().len()
    }
}

#[async_trait]
impl<P: RecordPayload> SyncApi<P> for FakeApi<P> {
    async fn push(&self, payloads: &[P]) -> SyncResult<DataPushResponse> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        let hook = self.before_push_returns.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        if self.push_fails.load(Ordering::SeqCst) {
            return Err(SyncError::Network("connection reset".into()));
        }
        self.pushed.lock().unwrap().push(payloads.to_vec());

        let reject = self.reject.lock().unwrap();
        Ok(DataPushResponse::with_errors(
            reject.iter().copied().map(validation_error).collect(),
        ))
    }

    async fn pull(
        &self,
        batch_size: usize,
        process_token: Option<&str>,
    ) -> SyncResult<DataPullResponse<P>> {
        self.pulls
            .lock()
            .unwrap()
            .push((batch_size, process_token.map(str::to_string)));
        if self.pull_fails.load(Ordering::SeqCst) {
            return Err(SyncError::Server {
                status: 503,
                body: "maintenance".into(),
            });
        }

        let offset: usize = process_token.map_or(0, |t| t.parse().unwrap());
        let records = self.server_records.lock().unwrap();
        let end = (offset + batch_size).min(records.len());
        let start = offset.min(end);
        Ok(DataPullResponse {
            payloads: records[start..end].to_vec(),
            process_token: end.to_string(),
        })
    }
}
