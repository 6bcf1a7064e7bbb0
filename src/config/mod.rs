//! Hot-reloadable configuration manager.
//!
//! # Data Flow
//! ```text
//! ConfigManager::init (at most once)
//!     → loader.rs (resolve path, read or create, decode, fall back to default)
//!     → store.rs (seed generation 0)
//!     → watcher.rs (notify backend + debounce loop)
//!
//! On a debounced write:
//!     reload.rs re-reads and re-decodes the file
//!     → store.rs atomic swap (skipped on failure: last known good)
//!     → subscription.rs fires every callback on its own task
//! ```
//!
//! [`ConfigManager`] is the explicit process-wide handle. Keep one per
//! config type, either in a `static` behind [`std::sync::LazyLock`] or
//! shared through an `Arc`:
//!
//! ```rust,no_run
//! use std::sync::LazyLock;
//!
//! use hotcfg::config::{ConfigManager, ManagerOptions};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct AppConfig {
//!     app_name: String,
//!     port: u16,
//! }
//!
//! static CONFIG: LazyLock<ConfigManager<AppConfig>> = LazyLock::new(ConfigManager::new);
//!
//! # async fn run() -> Result<(), hotcfg::error::HotcfgError> {
//! CONFIG
//!     .init(b"appName = \"X\"\nport = 8080\n", ManagerOptions::default())
//!     .await?;
//! CONFIG.on_change(|cfg| println!("now listening on {}", cfg.port));
//! println!("{}", CONFIG.get().app_name);
//! # Ok(())
//! # }
//! ```

pub mod format;
pub mod loader;
pub mod options;
pub mod reload;
pub mod store;
pub mod subscription;
pub mod watcher;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;

use crate::error::HotcfgError;
use format::sha256_hex;
use loader::{load_or_create, LoadOrigin, Loaded};
use reload::ReloadPipeline;
use watcher::{WatchHandle, Watcher};

pub use format::Format;
pub use options::ManagerOptions;
pub use reload::{ReloadOutcome, ReloadStats};
pub use store::{ConfigStore, Snapshot};
pub use subscription::SubscriptionRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigVersion {
    Hash(String),
}

impl ConfigVersion {
    /// Version of a raw payload: its SHA-256 digest.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self::Hash(sha256_hex(bytes))
    }

    /// First eight hex digits, for logs.
    #[must_use]
    pub fn short(&self) -> &str {
        match self {
            Self::Hash(h) => h.get(..8).unwrap_or(h),
        }
    }
}

impl std::fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(h) => f.write_str(h),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// This call performed the initialization.
    Initialized(LoadOrigin),
    /// Another call already completed it; nothing was done.
    AlreadyInitialized,
}

#[derive(Debug)]
enum InitState {
    Uninitialized,
    Ready { watch: Option<WatchHandle> },
    Failed(String),
}

pub struct ConfigManager<T> {
    store: Arc<ConfigStore<T>>,
    subscribers: Arc<SubscriptionRegistry<T>>,
    stats: Arc<ReloadStats>,
    // Held for the whole initialization so concurrent callers wait for it.
    state: tokio::sync::Mutex<InitState>,
    path: OnceLock<PathBuf>,
}

impl<T> Default for ConfigManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConfigManager<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(ConfigStore::new()),
            subscribers: Arc::new(SubscriptionRegistry::new()),
            stats: Arc::new(ReloadStats::new()),
            state: tokio::sync::Mutex::new(InitState::Uninitialized),
            path: OnceLock::new(),
        }
    }

    /// Register a callback invoked with every successfully reloaded
    /// configuration. May be called before or after `init`.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.register(callback);
    }

    /// The current generation with its metadata, if initialized.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot<T>>> {
        self.store.load()
    }

    #[must_use]
    pub fn stats(&self) -> &ReloadStats {
        &self.stats
    }

    /// Resolved config file path, once initialization has succeeded.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.get().map(PathBuf::as_path)
    }

    /// Stop watching the file. The last published configuration stays
    /// readable; no further reloads happen.
    pub async fn shutdown(&self) {
        let watch = match &mut *self.state.lock().await {
            InitState::Ready { watch } => watch.take(),
            _ => None,
        };
        if let Some(watch) = watch {
            watch.stop().await;
        }
    }
}

impl<T: Default> ConfigManager<T> {
    /// Current configuration. Never blocks; before `init` it is `T::default()`.
    #[must_use]
    pub fn get(&self) -> Arc<T> {
        self.store.get()
    }
}

impl<T> ConfigManager<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Load the configuration, seed the store and start watching.
    ///
    /// Runs at most once. Concurrent callers wait for the first one and then
    /// get [`InitOutcome::AlreadyInitialized`]. A failure is terminal: it is
    /// returned to this caller and, as [`HotcfgError::InitFailed`], to every
    /// later one. Callers are expected to treat it as fatal. Must be called
    /// from within a Tokio runtime.
    pub async fn init(
        &self,
        default_bytes: impl AsRef<[u8]>,
        options: ManagerOptions,
    ) -> Result<InitOutcome, HotcfgError> {
        let mut state = self.state.lock().await;
        match &*state {
            InitState::Ready { .. } => return Ok(InitOutcome::AlreadyInitialized),
            InitState::Failed(reason) => return Err(HotcfgError::InitFailed(reason.clone())),
            InitState::Uninitialized => {}
        }

        match self.initialize(default_bytes.as_ref(), &options).await {
            Ok((origin, watch)) => {
                *state = InitState::Ready { watch: Some(watch) };
                Ok(InitOutcome::Initialized(origin))
            }
            Err(e) => {
                self.store.clear();
                tracing::error!(error = %e, "config initialization failed");
                *state = InitState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn initialize(
        &self,
        default_bytes: &[u8],
        options: &ManagerOptions,
    ) -> Result<(LoadOrigin, WatchHandle), HotcfgError> {
        let path = options.resolve_path()?;
        let format = options.resolve_format(&path)?;

        let Loaded {
            config,
            version,
            origin,
        } = load_or_create::<T>(&path, format, default_bytes).await?;
        let short_version = version.short().to_string();
        self.store.seed(config, version);

        let pipeline = Arc::new(ReloadPipeline::new(
            path.clone(),
            format,
            Arc::clone(&self.store),
            Arc::clone(&self.subscribers),
            Arc::clone(&self.stats),
        ));
        let watch = Watcher::start(&path, options.debounce(), move || {
            let pipeline = Arc::clone(&pipeline);
            async move {
                pipeline.reload().await;
            }
        })?;

        tracing::info!(
            path = %path.display(),
            origin = ?origin,
            version = %short_version,
            "config initialized"
        );
        // Only reachable once: the state lock is held and the state was Uninitialized.
        let _ = self.path.set(path);

        Ok((origin, watch))
    }
}
