//! Integration tests for one-time initialization: default materialization,
//! concurrent init, fallbacks, and terminal failures.

#![cfg(feature = "toml")]

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{config_path, options, AppConfig, DEFAULTS};
use hotcfg::config::loader::LoadOrigin;
use hotcfg::config::{ConfigManager, ConfigVersion, InitOutcome, ManagerOptions};
use hotcfg::error::HotcfgError;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_file_is_materialized_from_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let manager: ConfigManager<AppConfig> = ConfigManager::new();

    let outcome = manager.init(DEFAULTS, options(dir.path())).await.unwrap();

    assert_eq!(outcome, InitOutcome::Initialized(LoadOrigin::Created));
    let path = config_path(dir.path());
    assert_eq!(std::fs::read(&path).unwrap(), DEFAULTS);
    assert_eq!(manager.path(), Some(path.as_path()));

    let cfg = manager.get();
    assert_eq!(cfg.app_name, "X");
    assert_eq!(cfg.port, 8080);

    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.generation, 0);
    assert_eq!(snapshot.version, ConfigVersion::of(DEFAULTS));

    manager.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_init_runs_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let manager: Arc<ConfigManager<AppConfig>> = Arc::new(ConfigManager::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let options = options(dir.path());
            tokio::spawn(async move { manager.init(DEFAULTS, options).await })
        })
        .collect();

    let mut performed = 0;
    let mut observed = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            InitOutcome::Initialized(origin) => {
                assert_eq!(origin, LoadOrigin::Created);
                performed += 1;
            }
            InitOutcome::AlreadyInitialized => observed += 1,
        }
    }

    assert_eq!(performed, 1);
    assert_eq!(observed, 15);
    assert_eq!(manager.get().port, 8080);

    manager.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_init_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let manager: ConfigManager<AppConfig> = ConfigManager::new();

    manager.init(DEFAULTS, options(dir.path())).await.unwrap();
    let first = manager.get();

    let outcome = manager
        .init(b"port=1".as_slice(), options(dir.path()))
        .await
        .unwrap();

    assert_eq!(outcome, InitOutcome::AlreadyInitialized);
    assert!(Arc::ptr_eq(&first, &manager.get()));

    manager.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn existing_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(config_path(dir.path()), "port=9090").unwrap();
    let manager: ConfigManager<AppConfig> = ConfigManager::new();

    let outcome = manager.init(DEFAULTS, options(dir.path())).await.unwrap();

    assert_eq!(outcome, InitOutcome::Initialized(LoadOrigin::File));
    assert_eq!(manager.get().port, 9090);

    manager.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_file_falls_back_to_defaults_and_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = config_path(dir.path());
    std::fs::write(&path, "port = [unterminated").unwrap();
    let manager: ConfigManager<AppConfig> = ConfigManager::new();

    let outcome = manager.init(DEFAULTS, options(dir.path())).await.unwrap();

    assert!(matches!(
        outcome,
        InitOutcome::Initialized(LoadOrigin::Fallback { .. })
    ));
    assert_eq!(manager.get().port, 8080);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "port = [unterminated"
    );

    manager.shutdown().await;
}

#[tokio::test]
async fn get_before_init_returns_default() {
    let manager: ConfigManager<AppConfig> = ConfigManager::new();
    assert_eq!(*manager.get(), AppConfig::default());
}

#[tokio::test]
async fn broken_default_payload_is_fatal_and_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let manager: ConfigManager<AppConfig> = ConfigManager::new();

    let err = manager
        .init(b"port = ".as_slice(), options(dir.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, HotcfgError::DefaultPayload { .. }));
    assert!(!config_path(dir.path()).exists());

    let again = manager.init(DEFAULTS, options(dir.path())).await.unwrap_err();
    assert!(matches!(again, HotcfgError::InitFailed(_)));
    assert_eq!(*manager.get(), AppConfig::default());
}

#[tokio::test]
async fn unsupported_extension_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let manager: ConfigManager<AppConfig> = ConfigManager::new();

    let err = manager
        .init(DEFAULTS, ManagerOptions::for_path(dir.path().join("config.ini")))
        .await
        .unwrap_err();

    assert!(matches!(err, HotcfgError::UnsupportedFormat(ref ext) if ext == "ini"));
}

#[tokio::test]
async fn watch_failure_after_load_leaves_nothing_published() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let manager: ConfigManager<AppConfig> = ConfigManager::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    manager.on_change(move |_: &AppConfig| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // The file cannot be read under a regular file, so init falls back to
    // the defaults and seeds them before the watch is attempted.
    let err = manager
        .init(DEFAULTS, ManagerOptions::default().with_base_dir(&blocker))
        .await
        .unwrap_err();

    assert!(matches!(err, HotcfgError::Watch { .. }));
    assert!(manager.snapshot().is_none());
    assert_eq!(*manager.get(), AppConfig::default());
    assert!(manager.path().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let again = manager.init(DEFAULTS, options(dir.path())).await.unwrap_err();
    assert!(matches!(again, HotcfgError::InitFailed(_)));
    assert!(!config_path(dir.path()).exists());
}
