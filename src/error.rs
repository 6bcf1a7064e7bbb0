//! Unified error type for hotcfg.
//!
//! [`HotcfgError`] covers every failure the configuration manager can
//! report. Fatal initialization failures (path resolution, a broken
//! default payload, default file creation, watch setup) are returned from
//! `init`. Recoverable failures (unreadable or malformed files) are logged
//! where they happen and never reach `get()` callers. Messages carry
//! contextual hints to guide the user toward a fix.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HotcfgError {
    #[error("Cannot resolve the executable directory: {source}")]
    PathResolution {
        #[source]
        source: std::io::Error,
    },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Default config payload does not decode (this is a bug in the embedded default):\n  {source}")]
    DefaultPayload {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Cannot create default config file {}: {source}", path.display())]
    CreateDefault {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Config initialization previously failed: {0}")]
    InitFailed(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
