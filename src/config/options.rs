//! Knobs for [`ConfigManager::init`](super::ConfigManager::init).

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::format::Format;
use super::loader::{executable_dir, resolve, DEFAULT_FILE_NAME};
use super::watcher::DEFAULT_DEBOUNCE;
use crate::error::HotcfgError;

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    base_dir: Option<PathBuf>,
    file_name: PathBuf,
    format: Option<Format>,
    debounce: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            file_name: PathBuf::from(DEFAULT_FILE_NAME),
            format: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ManagerOptions {
    /// Options pointing at an explicit file instead of the executable's
    /// directory.
    #[must_use]
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path
            .file_name()
            .map_or_else(|| PathBuf::from(DEFAULT_FILE_NAME), PathBuf::from);

        Self {
            base_dir: Some(base_dir),
            file_name,
            ..Self::default()
        }
    }

    /// Directory holding the config file. Defaults to the directory of the
    /// running executable.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<PathBuf>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Force a format instead of inferring it from the file extension.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, quiet_period: Duration) -> Self {
        self.debounce = quiet_period;
        self
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn resolve_path(&self) -> Result<PathBuf, HotcfgError> {
        let base_dir = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => executable_dir()?,
        };
        Ok(resolve(&base_dir, &self.file_name))
    }

    pub fn resolve_format(&self, path: &Path) -> Result<Format, HotcfgError> {
        self.format.map_or_else(|| Format::from_path(path), Ok)
    }
}
