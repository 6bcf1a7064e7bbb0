//! Hot reload: re-read, re-decode, publish, fan out.
//!
//! Runs once per debounced trigger. A read or decode failure is logged
//! and counted, and the current snapshot stays in place (last known
//! good). On success the new snapshot is swapped in and every registered
//! callback is dispatched without waiting for any of them.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::format::{decode, Format};
use super::store::ConfigStore;
use super::subscription::SubscriptionRegistry;
use super::ConfigVersion;

#[derive(Debug)]
pub struct ReloadStats {
    reloads: AtomicU64,
    failures: AtomicU64,
}

impl Default for ReloadStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reloads: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Successful hot reloads.
    #[must_use]
    pub fn reloads(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Hot reloads rejected because the file could not be read or decoded.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied { generation: u64, subscribers: usize },
    ReadFailed(String),
    DecodeFailed(String),
}

pub struct ReloadPipeline<T> {
    path: PathBuf,
    format: Format,
    store: Arc<ConfigStore<T>>,
    subscribers: Arc<SubscriptionRegistry<T>>,
    stats: Arc<ReloadStats>,
}

impl<T> ReloadPipeline<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(
        path: PathBuf,
        format: Format,
        store: Arc<ConfigStore<T>>,
        subscribers: Arc<SubscriptionRegistry<T>>,
        stats: Arc<ReloadStats>,
    ) -> Self {
        Self {
            path,
            format,
            store,
            subscribers,
            stats,
        }
    }

    pub async fn reload(&self) -> ReloadOutcome {
        let label = self.path.display().to_string();

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    path = %label,
                    error = %e,
                    "config reload failed, keeping current config"
                );
                return ReloadOutcome::ReadFailed(e.to_string());
            }
        };

        let config: T = match decode(self.format, &bytes, &label) {
            Ok(config) => config,
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    path = %label,
                    error = %e,
                    "config reload failed, keeping current config"
                );
                return ReloadOutcome::DecodeFailed(e.to_string());
            }
        };

        let version = ConfigVersion::of(&bytes);
        let config = Arc::new(config);
        let generation = self.store.swap(Arc::clone(&config), version.clone());
        self.stats.reloads.fetch_add(1, Ordering::Relaxed);

        let subscribers = self.subscribers.notify(&config, generation);

        tracing::info!(
            path = %label,
            generation,
            version = version.short(),
            subscribers,
            "config reloaded"
        );

        ReloadOutcome::Applied {
            generation,
            subscribers,
        }
    }
}
