//! Parsing and validation of `kiln.toml` diagnostic settings.
//!
//! This crate reads the `[diagnostics]` section of the project configuration
//! file into a strongly-typed [`KilnConfig`] and resolves it, together with
//! command-line [`Overrides`], into the settings used to build an aggregator.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE,
};
pub use resolve::{resolve_diagnostics, Overrides, ResolvedDiagnostics, ResolvedListener};
pub use types::*;
