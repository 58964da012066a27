use async_trait::async_trait;
use clinic_sync::{
    BatchSize, DataSync, DataSyncConfig, ModelSync, PullSummary, PushSummary, StaticUserSession,
    SyncConfig, SyncError, SyncGroup, SyncInterval, SyncResult, SyncScheduler,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

struct CountingSync {
    config: SyncConfig,
    runs: AtomicUsize,
    fail: AtomicBool,
}

impl CountingSync {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            config: SyncConfig::new("blood_pressures", BatchSize::Small, SyncGroup::Frequent),
            runs: AtomicUsize::new(0),
            fail: AtomicBool::new(fail),
        })
    }
}

#[async_trait]
impl ModelSync for CountingSync {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn config(&self) -> &SyncConfig {
        &self.config
    }

    async fn push(&self) -> SyncResult<PushSummary> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::Network("offline".into()));
        }
        Ok(PushSummary::default())
    }

    async fn pull(&self) -> SyncResult<PullSummary> {
        Ok(PullSummary::default())
    }
}

const INTERVAL: SyncInterval = SyncInterval {
    frequency: Duration::from_secs(60),
    backoff_delay: Duration::from_secs(5),
};

fn scheduler(sync: &Arc<CountingSync>) -> SyncScheduler {
    let data_sync = DataSync::new(
        vec![Arc::clone(sync) as Arc<dyn ModelSync>],
        Arc::new(StaticUserSession::approved()),
        DataSyncConfig::default(),
    );
    SyncScheduler::new(Arc::new(data_sync), SyncGroup::Frequent).with_interval(INTERVAL)
}

#[test]
fn retry_delay_doubles_up_to_frequency() {
    let scheduler = scheduler(&CountingSync::new(false));
    let delays: Vec<_> = (0..6).map(|n| scheduler.retry_delay(n).as_secs()).collect();
    assert_eq!(delays, vec![60, 5, 10, 20, 40, 60]);
    assert_eq!(scheduler.retry_delay(u32::MAX), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn successful_syncs_repeat_every_frequency() {
    let sync = CountingSync::new(false);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = scheduler(&sync).spawn(shutdown_rx);

    tokio::time::sleep(Duration::from_secs(150)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    // t = 0, 60, 120
    assert_eq!(sync.runs.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn failures_retry_with_backoff() {
    let sync = CountingSync::new(true);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = scheduler(&sync).spawn(shutdown_rx);

    tokio::time::sleep(Duration::from_secs(20)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    // t = 0, 5, 15
    assert_eq!(sync.runs.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_shutdown_sender_stops_the_scheduler() {
    let sync = CountingSync::new(false);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = scheduler(&sync).spawn(shutdown_rx);

    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(shutdown_tx);
    handle.await.unwrap();

    assert_eq!(sync.runs.load(Ordering::SeqCst), 1);
}
