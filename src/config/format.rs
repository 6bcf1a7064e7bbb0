//! File format selection and decoding.
//!
//! The manager only needs "bytes in, `T` out, or a descriptive error".
//! [`Format`] is picked from the file extension, and [`decode`] dispatches
//! to the serde backend enabled by the matching cargo feature.

use std::path::Path;

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::error::HotcfgError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// Pick a format from a file extension (`toml`, `json`, `yaml`/`yml`).
    pub fn from_extension(ext: &str) -> Result<Self, HotcfgError> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(HotcfgError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, HotcfgError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Decode raw bytes into `T`. `label` names the origin in error messages.
///
/// An empty payload is handed to the decoder like any other input.
#[allow(unreachable_patterns)]
pub fn decode<T: DeserializeOwned>(
    format: Format,
    bytes: &[u8],
    label: &str,
) -> Result<T, HotcfgError> {
    let parse_err = |e: Box<dyn std::error::Error + Send + Sync>| HotcfgError::ConfigParse {
        path: label.to_string(),
        source: e,
    };

    match format {
        #[cfg(feature = "toml")]
        Format::Toml => {
            let content = std::str::from_utf8(bytes).map_err(|e| parse_err(Box::new(e)))?;
            toml::from_str(content).map_err(|e| parse_err(Box::new(e)))
        }

        #[cfg(feature = "json")]
        Format::Json => serde_json::from_slice(bytes).map_err(|e| parse_err(Box::new(e))),

        #[cfg(feature = "yaml")]
        Format::Yaml => {
            let content = std::str::from_utf8(bytes).map_err(|e| parse_err(Box::new(e)))?;
            serde_yml::from_str(content).map_err(|e| parse_err(Box::new(e)))
        }

        other => Err(HotcfgError::UnsupportedFormat(
            other.extension().to_string(),
        )),
    }
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
