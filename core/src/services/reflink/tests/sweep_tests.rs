//! Tests for the reflink sweep service

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use rl_shared::config::ReflinkConfig;

use crate::domain::entities::reflink::Intent;
use crate::repositories::{InMemoryReflinkRepository, ReflinkRepository};
use crate::services::reflink::{ManualClock, ReflinkSweepService, ReflinkTokenService, SweepConfig};

use super::mocks::FlakyReflinkRepository;

fn setup<R: ReflinkRepository + 'static>(
    repository: Arc<R>,
) -> (Arc<ReflinkTokenService<R>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
    let config = ReflinkConfig::new("sweep-key").with_ttl_seconds(60);
    let store = ReflinkTokenService::with_clock(repository, &config, clock.clone()).unwrap();
    (Arc::new(store), clock)
}

#[tokio::test]
async fn test_run_sweep_deletes_expired() {
    let repository = Arc::new(InMemoryReflinkRepository::new());
    let (store, clock) = setup(repository.clone());

    let old = store.create_default(Uuid::new_v4(), Intent::PASSWORD_RESET).await.unwrap();
    clock.advance(Duration::seconds(90));
    let fresh = store.create_default(Uuid::new_v4(), Intent::PASSWORD_RESET).await.unwrap();

    let sweep = ReflinkSweepService::new(store.clone(), SweepConfig::default());
    let result = sweep.run_sweep().await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.expired_tokens_deleted, 1);
    assert!(store.load(&old).await.unwrap().is_none());
    assert!(store.load(&fresh).await.unwrap().is_some());
}

#[tokio::test]
async fn test_disabled_sweep_does_nothing() {
    let repository = Arc::new(InMemoryReflinkRepository::new());
    let (store, clock) = setup(repository.clone());

    store.create_default(Uuid::new_v4(), Intent::PASSWORD_RESET).await.unwrap();
    clock.advance(Duration::seconds(90));

    let config = SweepConfig::from(&ReflinkConfig::default().with_sweep_enabled(false));
    let sweep = Arc::new(ReflinkSweepService::new(store, config));

    let result = sweep.run_sweep().await.unwrap();
    assert_eq!(result.expired_tokens_deleted, 0);
    assert!(sweep.start_background_task().is_none());
    assert_eq!(repository.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_sweep_records_storage_errors() {
    let repository = Arc::new(FlakyReflinkRepository::new());
    let (store, _) = setup(repository.clone());
    repository.set_failing(true);

    let sweep = ReflinkSweepService::new(store, SweepConfig::default());
    let result = sweep.run_sweep().await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("connection lost"));
}

#[tokio::test(start_paused = true)]
async fn test_background_task_sweeps_on_interval() {
    let repository = Arc::new(InMemoryReflinkRepository::new());
    let (store, clock) = setup(repository.clone());

    store.create_default(Uuid::new_v4(), Intent::PASSWORD_RESET).await.unwrap();

    let config = SweepConfig {
        interval_seconds: 30,
        enabled: true,
    };
    let sweep = Arc::new(ReflinkSweepService::new(store.clone(), config));
    let handle = sweep.start_background_task().unwrap();

    // First tick fires immediately; nothing has expired yet
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert_eq!(repository.count().await.unwrap(), 1);

    clock.advance(Duration::seconds(61));
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    assert_eq!(repository.count().await.unwrap(), 0);

    handle.abort();
}
