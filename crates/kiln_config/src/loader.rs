//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{KilnConfig, ListenerKind};
use std::path::Path;

/// The configuration file name looked up in a project directory.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates a `kiln.toml` configuration from a project directory.
///
/// Reads `<project_dir>/kiln.toml`, parses it, and validates it. A missing file
/// is not an error: the defaults are returned.
pub fn load_config(project_dir: &Path) -> Result<KilnConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.is_file() {
        tracing::debug!(path = %config_path.display(), "no configuration file, using defaults");
        return Ok(KilnConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates exactly the configuration file at `path`.
///
/// Unlike [`load_config`], a missing file is an error.
pub fn load_config_file(path: &Path) -> Result<KilnConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<KilnConfig, ConfigError> {
    let config: KilnConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates value ranges and per-kind listener requirements.
pub fn validate_config(config: &KilnConfig) -> Result<(), ConfigError> {
    let diagnostics = &config.diagnostics;
    if diagnostics.throttle_limit == 0 {
        return Err(ConfigError::ValidationError(
            "diagnostics.throttle_limit must be at least 1".to_string(),
        ));
    }
    for (i, listener) in diagnostics.listeners.iter().enumerate() {
        let kind = ListenerKind::from_name(&listener.kind)
            .ok_or_else(|| ConfigError::UnknownListener(listener.kind.clone()))?;
        let has_path = listener.path.as_deref().is_some_and(|p| !p.is_empty());
        if kind == ListenerKind::JsonFile && !has_path {
            return Err(ConfigError::MissingField(format!(
                "diagnostics.listeners[{i}].path"
            )));
        }
    }
    Ok(())
}
