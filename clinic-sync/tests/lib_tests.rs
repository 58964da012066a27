use clinic_storage::StorageError;
use clinic_sync::{
    ApiConfig, BatchSize, DataSyncConfig, ResolvedError, SyncConfig, SyncError, SyncGroup,
    SyncInterval,
};
use std::time::Duration;

// ── Config ──────────────────────────────────────────────────────

#[test]
fn batch_size_presets() {
    assert_eq!(BatchSize::VerySmall.rows(), 10);
    assert_eq!(BatchSize::Small.rows(), 100);
    assert_eq!(BatchSize::Medium.rows(), 500);
    assert_eq!(BatchSize::Large.rows(), 1000);
    assert_eq!(BatchSize::default(), BatchSize::Medium);
}

#[test]
fn sync_intervals() {
    assert_eq!(SyncInterval::FREQUENT.frequency, Duration::from_secs(16 * 60));
    assert_eq!(SyncInterval::DAILY.frequency, Duration::from_secs(86_400));
    assert_eq!(SyncInterval::DAILY.backoff_delay, Duration::from_secs(300));
    assert_eq!(SyncGroup::Frequent.interval(), SyncInterval::FREQUENT);
}

#[test]
fn sync_group_parse_and_display() {
    assert_eq!("frequent".parse::<SyncGroup>().unwrap(), SyncGroup::Frequent);
    assert_eq!("DAILY".parse::<SyncGroup>().unwrap(), SyncGroup::Daily);
    assert!("hourly".parse::<SyncGroup>().is_err());
    assert_eq!(SyncGroup::Daily.to_string(), "daily");
    assert_eq!(
        serde_json::to_string(&SyncGroup::Frequent).unwrap(),
        "\"frequent\""
    );
}

#[test]
fn sync_config_new_uses_group_interval() {
    let config = SyncConfig::new("facilities", BatchSize::Large, SyncGroup::Daily);
    assert_eq!(config.name, "facilities");
    assert_eq!(config.pull_batch_size, 1000);
    assert_eq!(config.push_batch_size, 1000);
    assert_eq!(config.sync_interval, SyncInterval::DAILY);
}

#[test]
fn api_config_defaults_and_partial_json() {
    let config: ApiConfig =
        serde_json::from_str(r#"{"base_url": "https://api.example.org"}"#).unwrap();
    assert_eq!(config.base_url, "https://api.example.org");
    assert_eq!(config.timeout_secs, 30);
    assert!(config.access_token.is_none());
}

#[test]
fn api_config_debug_hides_token() {
    let config = ApiConfig {
        access_token: Some("very-secret".to_string()),
        ..ApiConfig::default()
    };
    let debug = format!("{config:?}");
    assert!(!debug.contains("very-secret"));
    assert!(debug.contains("redacted"));
}

#[test]
fn data_sync_config_default_runs_one_sync_at_a_time() {
    assert_eq!(DataSyncConfig::default().max_parallel_syncs, 1);
}

// ── Error resolution ────────────────────────────────────────────

#[test]
fn errors_resolve_by_kind() {
    assert_eq!(
        SyncError::Network("reset".into()).resolve(),
        ResolvedError::NetworkRelated
    );
    assert_eq!(
        SyncError::Unauthenticated.resolve(),
        ResolvedError::Unauthenticated
    );
    assert_eq!(
        SyncError::Server {
            status: 503,
            body: String::new()
        }
        .resolve(),
        ResolvedError::ServerError
    );
    assert_eq!(
        SyncError::Http {
            status: 409,
            body: String::new()
        }
        .resolve(),
        ResolvedError::Unexpected
    );
    assert_eq!(
        SyncError::Storage(StorageError::LockPoisoned).resolve(),
        ResolvedError::Unexpected
    );
}

#[test]
fn authentication_failure_wins_in_combined_errors() {
    let err = SyncError::Multiple(vec![
        SyncError::Network("offline".into()),
        SyncError::Unauthenticated,
    ]);
    assert_eq!(err.resolve(), ResolvedError::Unauthenticated);
    assert!(err.to_string().contains("offline"));
}

#[test]
fn combine_collapses_single_errors() {
    assert!(SyncError::combine(Vec::new()).is_none());
    assert!(matches!(
        SyncError::combine(vec![SyncError::Unauthenticated]),
        Some(SyncError::Unauthenticated)
    ));
    assert!(matches!(
        SyncError::combine(vec![SyncError::Unauthenticated, SyncError::Unauthenticated]),
        Some(SyncError::Multiple(_))
    ));
}

#[test]
fn severe_errors() {
    assert!(ResolvedError::ServerError.is_severe());
    assert!(ResolvedError::Unexpected.is_severe());
    assert!(!ResolvedError::NetworkRelated.is_severe());
    assert!(!ResolvedError::Unauthenticated.is_severe());
}
