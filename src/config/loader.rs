//! Initial configuration load.
//!
//! Resolves the config path, reads it, and decodes it into the caller's
//! type. A missing file is materialized from the default payload. An
//! unreadable or malformed file falls back to the decoded default and is
//! left untouched on disk, so an in-progress user edit is never
//! overwritten.

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::format::{decode, Format};
use super::ConfigVersion;
use crate::error::HotcfgError;

pub const DEFAULT_FILE_NAME: &str = "config.toml";

const DEFAULT_LABEL: &str = "<default payload>";

/// How the initial configuration was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    /// The file was absent and has been written from the default payload.
    Created,
    /// The file existed and decoded successfully.
    File,
    /// The file could not be read or decoded; the default payload is in use.
    Fallback { reason: String },
}

#[derive(Debug)]
pub struct Loaded<T> {
    pub config: T,
    pub version: ConfigVersion,
    pub origin: LoadOrigin,
}

#[must_use]
pub fn resolve(base_dir: &Path, file_name: impl AsRef<Path>) -> PathBuf {
    base_dir.join(file_name)
}

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf, HotcfgError> {
    let exe = std::env::current_exe().map_err(|source| HotcfgError::PathResolution { source })?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| HotcfgError::PathResolution {
            source: io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} has no parent directory", exe.display()),
            ),
        })
}

/// Load `path`, creating it from `default_bytes` when absent.
///
/// Fails only when the default payload itself does not decode or the
/// default file cannot be written. Read and decode failures of an
/// existing file are logged and answered with the default.
pub async fn load_or_create<T: DeserializeOwned>(
    path: &Path,
    format: Format,
    default_bytes: &[u8],
) -> Result<Loaded<T>, HotcfgError> {
    let default_config: T = decode_default(format, default_bytes)?;
    let label = path.display().to_string();

    match tokio::fs::read(path).await {
        Ok(bytes) => match decode::<T>(format, &bytes, &label) {
            Ok(config) => {
                tracing::info!(path = %label, "config loaded");
                Ok(Loaded {
                    config,
                    version: ConfigVersion::of(&bytes),
                    origin: LoadOrigin::File,
                })
            }
            Err(e) => {
                tracing::warn!(
                    path = %label,
                    error = %e,
                    "config file is malformed, using built-in defaults"
                );
                Ok(fallback(default_config, default_bytes, e.to_string()))
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            write_default(path, default_bytes).await?;
            tracing::info!(path = %label, "config file not found, wrote defaults");
            Ok(Loaded {
                config: default_config,
                version: ConfigVersion::of(default_bytes),
                origin: LoadOrigin::Created,
            })
        }
        Err(e) => {
            tracing::warn!(
                path = %label,
                error = %e,
                "config file is unreadable, using built-in defaults"
            );
            Ok(fallback(default_config, default_bytes, e.to_string()))
        }
    }
}

fn decode_default<T: DeserializeOwned>(
    format: Format,
    default_bytes: &[u8],
) -> Result<T, HotcfgError> {
    decode(format, default_bytes, DEFAULT_LABEL).map_err(|e| match e {
        HotcfgError::ConfigParse { source, .. } => HotcfgError::DefaultPayload { source },
        other => other,
    })
}

async fn write_default(path: &Path, default_bytes: &[u8]) -> Result<(), HotcfgError> {
    let create_err = |source| HotcfgError::CreateDefault {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(create_err)?;
    }
    tokio::fs::write(path, default_bytes)
        .await
        .map_err(create_err)
}

fn fallback<T>(config: T, default_bytes: &[u8], reason: String) -> Loaded<T> {
    Loaded {
        config,
        version: ConfigVersion::of(default_bytes),
        origin: LoadOrigin::Fallback { reason },
    }
}
