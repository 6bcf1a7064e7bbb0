//! `hotcfg validate`: check that a configuration file decodes.
//!
//! Decodes the file with the format picked from its extension, reporting
//! results in either human-readable text or machine-readable JSON format.

use std::path::Path;

use serde_json::Value;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::format::decode;
use crate::config::{ConfigVersion, Format};
use crate::error::HotcfgError;

pub fn execute(args: &ValidateArgs) -> Result<(), HotcfgError> {
    let path = &args.config;

    if !path.exists() {
        return Err(HotcfgError::ConfigFileNotFound { path: path.clone() });
    }

    let bytes = std::fs::read(path)?;
    let format = Format::from_path(path)?;

    let doc: Value = match decode(format, &bytes, &path.display().to_string()) {
        Ok(doc) => doc,
        Err(e) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} {} is not valid {}\n", path.display(), format.extension());
                }
                ValidateFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "valid": false,
                            "error": e.to_string(),
                        })
                    );
                }
            }
            return Err(e);
        }
    };

    let version = ConfigVersion::of(&bytes);
    let keys = doc.as_object().map_or(0, serde_json::Map::len);

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {}", format_report(path, format, keys, &version));
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "format": format.extension(),
                    "keys": keys,
                    "version": version.to_string(),
                })
            );
        }
    }

    Ok(())
}

#[must_use]
pub fn format_report(path: &Path, format: Format, keys: usize, version: &ConfigVersion) -> String {
    format!(
        "{} is valid {} ({keys} top-level keys, version {})",
        path.display(),
        format.extension(),
        version.short()
    )
}
