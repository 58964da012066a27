//! Sync tuning: batch sizes, intervals, groups and server connection settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Number of records sent or requested per round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSize {
    VerySmall,
    Small,
    #[default]
    Medium,
    Large,
}

impl BatchSize {
    pub const fn rows(self) -> usize {
        match self {
            BatchSize::VerySmall => 10,
            BatchSize::Small => 100,
            BatchSize::Medium => 500,
            BatchSize::Large => 1000,
        }
    }
}

/// How often a group syncs, and how long to wait before retrying a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncInterval {
    pub frequency: Duration,
    pub backoff_delay: Duration,
}

impl SyncInterval {
    pub const FREQUENT: SyncInterval = SyncInterval {
        frequency: Duration::from_secs(16 * 60),
        backoff_delay: Duration::from_secs(5 * 60),
    };

    pub const DAILY: SyncInterval = SyncInterval {
        frequency: Duration::from_secs(24 * 60 * 60),
        backoff_delay: Duration::from_secs(5 * 60),
    };
}

/// Syncs are scheduled in groups; each group runs on its own cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncGroup {
    /// Patient data that changes throughout the day.
    Frequent,
    /// Reference data such as facilities.
    Daily,
}

impl SyncGroup {
    pub const ALL: [SyncGroup; 2] = [SyncGroup::Frequent, SyncGroup::Daily];

    /// The default interval for syncs of this group.
    pub const fn interval(self) -> SyncInterval {
        match self {
            SyncGroup::Frequent => SyncInterval::FREQUENT,
            SyncGroup::Daily => SyncInterval::DAILY,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SyncGroup::Frequent => "frequent",
            SyncGroup::Daily => "daily",
        }
    }
}

impl fmt::Display for SyncGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SyncGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "frequent" => Ok(SyncGroup::Frequent),
            "daily" => Ok(SyncGroup::Daily),
            other => Err(format!("unknown sync group: {other}")),
        }
    }
}

/// Configuration of one entity sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub name: String,
    pub sync_interval: SyncInterval,
    pub pull_batch_size: usize,
    pub push_batch_size: usize,
    pub sync_group: SyncGroup,
}

impl SyncConfig {
    /// A config using the same batch size for push and pull, and the group's
    /// default interval.
    pub fn new(name: impl Into<String>, batch_size: BatchSize, sync_group: SyncGroup) -> Self {
        Self {
            name: name.into(),
            sync_interval: sync_group.interval(),
            pull_batch_size: batch_size.rows(),
            push_batch_size: batch_size.rows(),
            sync_group,
        }
    }

    #[must_use]
    pub fn with_batch_sizes(self, pull_batch_size: usize, push_batch_size: usize) -> Self {
        Self {
            pull_batch_size,
            push_batch_size,
            ..self
        }
    }
}

/// Connection settings for the sync server.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server root, e.g. `https://api.example.org`.
    pub base_url: String,
    pub access_token: Option<String>,
    /// Sent as `X-USER-ID`.
    pub user_id: Option<String>,
    /// Sent as `X-FACILITY-ID`.
    pub facility_id: Option<String>,
    /// Sent as `X-SYNC-REGION-ID`.
    pub sync_region_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            access_token: None,
            user_id: None,
            facility_id: None,
            sync_region_id: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .field("facility_id", &self.facility_id)
            .field("sync_region_id", &self.sync_region_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Settings for the [`DataSync`](crate::DataSync) driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSyncConfig {
    /// How many entity syncs may run at the same time.
    pub max_parallel_syncs: usize,
}

impl Default for DataSyncConfig {
    fn default() -> Self {
        Self {
            max_parallel_syncs: 1,
        }
    }
}
