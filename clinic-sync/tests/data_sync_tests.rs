mod common;

use async_trait::async_trait;
use clinic_model::{Appointment, BloodPressurePayload, Synceable};
use clinic_storage::SynceableRepository;
use clinic_sync::{
    DataSync, DataSyncConfig, EntitySync, ModelSync, PullSummary, Purge, PurgeOnSync, PushSummary,
    ResolvedError, StaticUserSession, SyncApi, SyncConfig, SyncError, SyncGroup, SyncGroupResult,
    SyncOutcome, SyncProgress, SyncResult, BatchSize,
};
use clinic_types::{RecordId, SyncStatus};
use common::{FakeApi, bps, store, t0};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    FailNetwork,
    FailServer,
}

struct FakeSync {
    config: SyncConfig,
    requires_user: bool,
    behaviour: Behaviour,
    runs: AtomicUsize,
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
}

impl FakeSync {
    fn new(name: &str, group: SyncGroup, behaviour: Behaviour) -> Arc<Self> {
        Self::build(name, group, behaviour, true, Arc::default(), Arc::default())
    }

    fn without_user(name: &str, group: SyncGroup) -> Arc<Self> {
        Self::build(name, group, Behaviour::Succeed, false, Arc::default(), Arc::default())
    }

    fn build(
        name: &str,
        group: SyncGroup,
        behaviour: Behaviour,
        requires_user: bool,
        running: Arc<AtomicUsize>,
        max_running: Arc<AtomicUsize>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: SyncConfig::new(name, BatchSize::Small, group),
            requires_user,
            behaviour,
            runs: AtomicUsize::new(0),
            running,
            max_running,
        })
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelSync for FakeSync {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn requires_sync_approved_user(&self) -> bool {
        self.requires_user
    }

    async fn push(&self) -> SyncResult<PushSummary> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        match self.behaviour {
            Behaviour::Succeed => Ok(PushSummary::default()),
            Behaviour::FailNetwork => Err(SyncError::Network("timed out".into())),
            Behaviour::FailServer => Err(SyncError::Server {
                status: 500,
                body: String::new(),
            }),
        }
    }

    async fn pull(&self) -> SyncResult<PullSummary> {
        Ok(PullSummary::default())
    }
}

struct CountingPurge(AtomicUsize);

#[async_trait]
impl Purge for CountingPurge {
    async fn purge_unused_data(&self) -> SyncResult<usize> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }
}

fn data_sync(syncs: &[Arc<FakeSync>], session: StaticUserSession) -> DataSync {
    let syncs: Vec<Arc<dyn ModelSync>> = syncs
        .iter()
        .map(|s| Arc::clone(s) as Arc<dyn ModelSync>)
        .collect();
    DataSync::new(syncs, Arc::new(session), DataSyncConfig::default())
}

#[tokio::test]
async fn failing_sync_does_not_affect_the_others() {
    let ok_a = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let failing = FakeSync::new("call_results", SyncGroup::Frequent, Behaviour::FailNetwork);
    let ok_b = FakeSync::new("medical_histories", SyncGroup::Frequent, Behaviour::Succeed);
    let driver = data_sync(
        &[ok_a.clone(), failing.clone(), ok_b.clone()],
        StaticUserSession::approved(),
    );

    let reports = driver.sync(SyncGroup::Frequent).await;

    let outcomes: Vec<_> = reports.iter().map(|r| (r.name.as_str(), r.outcome)).collect();
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[0], ("blood_pressures", SyncOutcome::Completed(_))));
    assert_eq!(
        outcomes[1],
        (
            "call_results",
            SyncOutcome::Failed(ResolvedError::NetworkRelated)
        )
    );
    assert!(matches!(outcomes[2], ("medical_histories", SyncOutcome::Completed(_))));
    assert_eq!((ok_a.runs(), failing.runs(), ok_b.runs()), (1, 1, 1));
}

#[tokio::test]
async fn group_sync_only_runs_syncs_of_that_group() {
    let frequent = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let daily = FakeSync::new("facilities", SyncGroup::Daily, Behaviour::Succeed);
    let driver = data_sync(&[frequent.clone(), daily.clone()], StaticUserSession::approved());

    let reports = driver.sync(SyncGroup::Daily).await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].group, SyncGroup::Daily);
    assert_eq!((frequent.runs(), daily.runs()), (0, 1));
}

#[tokio::test]
async fn sync_the_world_runs_every_group() {
    let frequent = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let daily = FakeSync::new("facilities", SyncGroup::Daily, Behaviour::Succeed);
    let driver = data_sync(&[frequent.clone(), daily.clone()], StaticUserSession::approved());

    let reports = driver.sync_the_world().await;

    assert_eq!(reports.len(), 2);
    assert_eq!((frequent.runs(), daily.runs()), (1, 1));
}

#[tokio::test]
async fn syncs_needing_an_approved_user_are_skipped_without_one() {
    let patient_data = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let reference_data = FakeSync::without_user("facilities", SyncGroup::Frequent);
    let unapproved = StaticUserSession {
        user_present: true,
        can_sync: false,
    };
    let driver = data_sync(&[patient_data.clone(), reference_data.clone()], unapproved);

    let reports = driver.sync(SyncGroup::Frequent).await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "facilities");
    assert_eq!((patient_data.runs(), reference_data.runs()), (0, 1));
}

#[tokio::test]
async fn progress_reports_syncing_then_success() {
    let sync = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let driver = data_sync(&[sync], StaticUserSession::approved());
    let mut progress = driver.subscribe_progress();

    driver.sync(SyncGroup::Frequent).await;

    assert_eq!(
        progress.recv().await.unwrap(),
        SyncGroupResult {
            group: SyncGroup::Frequent,
            progress: SyncProgress::Syncing
        }
    );
    assert_eq!(
        progress.recv().await.unwrap(),
        SyncGroupResult {
            group: SyncGroup::Frequent,
            progress: SyncProgress::Success
        }
    );
}

#[tokio::test]
async fn failed_group_reports_failure_and_first_error() {
    let server_down = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::FailServer);
    let offline = FakeSync::new("call_results", SyncGroup::Frequent, Behaviour::FailNetwork);
    let driver = data_sync(&[server_down, offline], StaticUserSession::approved());
    let mut progress = driver.subscribe_progress();
    let mut errors = driver.subscribe_errors();

    driver.sync(SyncGroup::Frequent).await;

    assert_eq!(progress.recv().await.unwrap().progress, SyncProgress::Syncing);
    assert_eq!(progress.recv().await.unwrap().progress, SyncProgress::Failure);
    assert_eq!(errors.recv().await.unwrap(), ResolvedError::ServerError);
    assert!(errors.try_recv().is_err());
}

#[tokio::test]
async fn purge_runs_after_a_fully_successful_sync() {
    let sync = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let purge = Arc::new(CountingPurge(AtomicUsize::new(0)));
    let driver = data_sync(&[sync], StaticUserSession::approved()).with_purge(purge.clone());

    driver.sync_the_world().await;

    assert_eq!(purge.0.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn purge_is_skipped_when_any_sync_failed() {
    let ok = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let failing = FakeSync::new("facilities", SyncGroup::Daily, Behaviour::FailNetwork);
    let purge = Arc::new(CountingPurge(AtomicUsize::new(0)));
    let driver =
        data_sync(&[ok, failing], StaticUserSession::approved()).with_purge(purge.clone());

    driver.sync_the_world().await;

    assert_eq!(purge.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn purge_is_skipped_without_a_logged_in_user() {
    let reference = FakeSync::without_user("facilities", SyncGroup::Daily);
    let purge = Arc::new(CountingPurge(AtomicUsize::new(0)));
    let driver =
        data_sync(&[reference], StaticUserSession::logged_out()).with_purge(purge.clone());

    driver.sync_the_world().await;

    assert_eq!(purge.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn parallelism_is_bounded_by_max_parallel_syncs() {
    for (limit, expected) in [(1, 1), (3, 3)] {
        let running = Arc::new(AtomicUsize::new(0));
        let max_running = Arc::new(AtomicUsize::new(0));
        let syncs: Vec<Arc<dyn ModelSync>> = (0..4)
            .map(|i| {
                FakeSync::build(
                    &format!("sync-{i}"),
                    SyncGroup::Frequent,
                    Behaviour::Succeed,
                    true,
                    Arc::clone(&running),
                    Arc::clone(&max_running),
                ) as Arc<dyn ModelSync>
            })
            .collect();
        let driver = DataSync::new(
            syncs,
            Arc::new(StaticUserSession::approved()),
            DataSyncConfig {
                max_parallel_syncs: limit,
            },
        );

        driver.sync(SyncGroup::Frequent).await;

        assert_eq!(max_running.load(Ordering::SeqCst), expected);
    }
}

#[tokio::test]
async fn fire_and_forget_runs_in_the_background() {
    let sync = FakeSync::new("blood_pressures", SyncGroup::Frequent, Behaviour::Succeed);
    let driver = Arc::new(data_sync(&[sync.clone()], StaticUserSession::approved()));

    driver.fire_and_forget_sync().await.unwrap();
    driver
        .fire_and_forget_sync_group(SyncGroup::Frequent)
        .await
        .unwrap();
    driver
        .fire_and_forget_sync_group(SyncGroup::Daily)
        .await
        .unwrap();

    assert_eq!(sync.runs(), 2);
}

#[tokio::test]
async fn overlapping_group_syncs_push_each_record_once() {
    let s = store();
    s.repo.save(&bps(3)).unwrap();
    let api = FakeApi::<BloodPressurePayload>::new();
    let sync: Arc<dyn ModelSync> = Arc::new(EntitySync::new(
        Arc::clone(&s.repo),
        Arc::clone(&api) as Arc<dyn SyncApi<BloodPressurePayload>>,
        s.token.clone(),
        SyncConfig::new("blood_pressures", BatchSize::Small, SyncGroup::Frequent),
    ));
    let driver = Arc::new(DataSync::new(
        vec![sync],
        Arc::new(StaticUserSession::approved()),
        DataSyncConfig {
            max_parallel_syncs: 4,
        },
    ));
    let gate = api.hold_next_push();

    let first = driver.fire_and_forget_sync_group(SyncGroup::Frequent);
    gate.entered.notified().await;
    let second = driver.fire_and_forget_sync_group(SyncGroup::Frequent);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!second.is_finished());

    gate.release.notify_one();
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(api.push_batch_sizes(), vec![3]);
    assert_eq!(
        s.repo.records_with_sync_status(SyncStatus::Done).unwrap().len(),
        3
    );
}

#[tokio::test]
async fn purge_on_sync_covers_appointments() {
    let s = store();
    let appointment = Appointment::schedule(
        RecordId::new(),
        RecordId::new(),
        t0().date_naive(),
        t0(),
    )
    .deleted(t0())
    .with_sync_status(SyncStatus::Done);
    let appointments = s.db.repository::<Appointment>().unwrap();
    appointments.save(std::slice::from_ref(&appointment)).unwrap();

    let purge = PurgeOnSync::for_database(&s.db).unwrap();

    assert_eq!(purge.purge_unused_data().await.unwrap(), 1);
    assert_eq!(appointments.record_count().unwrap(), 0);
}
