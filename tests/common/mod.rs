//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use hotcfg::config::ManagerOptions;
use serde::Deserialize;

pub const DEFAULTS: &[u8] = b"appName=\"X\"\nport=8080";

/// Debounce window used by the tests, and how long to wait past it.
pub const DEBOUNCE: Duration = Duration::from_millis(100);
pub const SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub app_name: String,
    pub port: u16,
    #[serde(default)]
    pub debug: bool,
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join("config.toml")
}

pub fn options(dir: &Path) -> ManagerOptions {
    ManagerOptions::default()
        .with_base_dir(dir)
        .with_debounce(DEBOUNCE)
}

/// Poll `cond` until it holds or five seconds pass.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}
