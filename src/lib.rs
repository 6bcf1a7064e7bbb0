//! hotcfg is a hot-reloadable, strongly-typed configuration manager.
//!
//! It loads a configuration object of the caller's type from a file,
//! watches that file, atomically swaps in every valid edit, and notifies
//! subscribers. A malformed edit never replaces the live configuration.
//!
//! # Architecture
//!
//! - [`config`] -- The manager: loading, the lock-free snapshot store,
//!   debounced file watching, the reload pipeline, and change callbacks.
//! - [`error`] -- Unified error type using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (watch, validate).
//! - [`shutdown`] -- SIGTERM / Ctrl+C handling for the binary.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `toml` | TOML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `yaml` | YAML config file support |
//! | `file-formats` | All file formats |

#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod shutdown;
