//! `hotcfg watch`: load a config file and follow its hot reloads.
//!
//! Initializes a [`ConfigManager`] over a schema-less document, logs every
//! reload it observes, and stops watching on SIGTERM / Ctrl+C.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::cli::WatchArgs;
use crate::config::{ConfigManager, Format, ManagerOptions};
use crate::error::HotcfgError;
use crate::{logging, shutdown};

pub async fn execute(args: WatchArgs) -> Result<(), HotcfgError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let format = Format::from_path(&args.config)?;
    let default_bytes = match args.defaults.as_deref() {
        Some(path) => read_defaults(path).await?,
        None => empty_document(format).to_vec(),
    };

    let manager: ConfigManager<Value> = ConfigManager::new();
    manager.on_change(|doc: &Value| {
        tracing::info!(keys = top_level_keys(doc), "config change observed");
    });

    let options = ManagerOptions::for_path(&args.config)
        .with_debounce(Duration::from_millis(args.debounce_ms));
    let outcome = manager.init(default_bytes, options).await?;

    tracing::info!(
        path = %args.config.display(),
        outcome = ?outcome,
        keys = top_level_keys(&manager.get()),
        "hotcfg watching"
    );

    shutdown::signal().await;
    manager.shutdown().await;

    let stats = manager.stats();
    tracing::info!(
        reloads = stats.reloads(),
        failures = stats.failures(),
        "hotcfg stopped"
    );
    Ok(())
}

async fn read_defaults(path: &Path) -> Result<Vec<u8>, HotcfgError> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HotcfgError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            HotcfgError::Io(e)
        }
    })
}

/// Smallest payload that decodes to an empty document in `format`.
const fn empty_document(format: Format) -> &'static [u8] {
    match format {
        Format::Toml => b"",
        Format::Json | Format::Yaml => b"{}",
    }
}

fn top_level_keys(doc: &Value) -> usize {
    doc.as_object().map_or(0, serde_json::Map::len)
}
