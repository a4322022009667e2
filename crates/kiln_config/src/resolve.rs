//! Settings resolution: merging the config file with command-line overrides.

use crate::error::ConfigError;
use crate::types::{KilnConfig, ListenerKind};
use kiln_diagnostics::{AggregatorBuilder, Severity};
use std::path::{Path, PathBuf};

/// Values given on the command line; `None` keeps the config file's value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Replaces `diagnostics.threshold`.
    pub threshold: Option<Severity>,
    /// Replaces `diagnostics.warnings_as_errors`.
    pub warnings_as_errors: Option<bool>,
    /// Replaces `diagnostics.throttle_limit`.
    pub throttle_limit: Option<usize>,
}

/// A listener entry with its kind checked and its path made absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedListener {
    /// The listener kind.
    pub kind: ListenerKind,
    /// Output path for file listeners, joined onto the project directory.
    pub path: Option<PathBuf>,
    /// Per-listener severity floor.
    pub min_severity: Option<Severity>,
    /// Explicit color setting for console listeners.
    pub color: Option<bool>,
    /// Custom listener name.
    pub name: Option<String>,
}

/// Fully resolved diagnostic settings for one build run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDiagnostics {
    /// Effective threshold.
    pub threshold: Severity,
    /// Effective warnings-as-errors flag.
    pub warnings_as_errors: bool,
    /// Effective throttle limit.
    pub throttle_limit: usize,
    /// Listeners in dispatch order.
    pub listeners: Vec<ResolvedListener>,
}

impl ResolvedDiagnostics {
    /// Returns an aggregator builder configured with these settings.
    ///
    /// Listeners are not attached; instantiating them is up to the host.
    pub fn aggregator_builder(&self) -> AggregatorBuilder {
        AggregatorBuilder::default()
            .threshold(self.threshold)
            .warnings_as_errors(self.warnings_as_errors)
            .throttle_limit(self.throttle_limit)
    }
}

/// Resolves the diagnostics section against `project_dir` and CLI overrides.
///
/// Override values take precedence over the file. Relative listener paths are
/// joined onto `project_dir`.
pub fn resolve_diagnostics(
    config: &KilnConfig,
    project_dir: &Path,
    overrides: &Overrides,
) -> Result<ResolvedDiagnostics, ConfigError> {
    let section = &config.diagnostics;

    let throttle_limit = overrides.throttle_limit.unwrap_or(section.throttle_limit);
    if throttle_limit == 0 {
        return Err(ConfigError::ValidationError(
            "throttle limit must be at least 1".to_string(),
        ));
    }

    let listeners = section
        .listeners
        .iter()
        .map(|entry| {
            let kind = ListenerKind::from_name(&entry.kind)
                .ok_or_else(|| ConfigError::UnknownListener(entry.kind.clone()))?;
            Ok(ResolvedListener {
                kind,
                path: entry.path.as_ref().map(|p| project_dir.join(p)),
                min_severity: entry.min_severity,
                color: entry.color,
                name: entry.name.clone(),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(ResolvedDiagnostics {
        threshold: overrides.threshold.unwrap_or(section.threshold),
        warnings_as_errors: overrides
            .warnings_as_errors
            .unwrap_or(section.warnings_as_errors),
        throttle_limit,
        listeners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    fn config() -> KilnConfig {
        load_config_from_str(
            r#"
[diagnostics]
threshold = "warning"
throttle_limit = 50

[[diagnostics.listeners]]
kind = "json-file"
path = "out/diag.jsonl"

[[diagnostics.listeners]]
kind = "console"
color = true
"#,
        )
        .unwrap()
    }

    #[test]
    fn file_values_without_overrides() {
        let resolved = resolve_diagnostics(&config(), Path::new("/site"), &Overrides::default())
            .unwrap();
        assert_eq!(resolved.threshold, Severity::Warning);
        assert!(!resolved.warnings_as_errors);
        assert_eq!(resolved.throttle_limit, 50);
        assert_eq!(resolved.listeners.len(), 2);
        assert_eq!(resolved.listeners[0].kind, ListenerKind::JsonFile);
        assert_eq!(
            resolved.listeners[0].path.as_deref(),
            Some(Path::new("/site/out/diag.jsonl"))
        );
        assert_eq!(resolved.listeners[1].color, Some(true));
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = Overrides {
            threshold: Some(Severity::Verbose),
            warnings_as_errors: Some(true),
            throttle_limit: Some(7),
        };
        let resolved = resolve_diagnostics(&config(), Path::new("."), &overrides).unwrap();
        assert_eq!(resolved.threshold, Severity::Verbose);
        assert!(resolved.warnings_as_errors);
        assert_eq!(resolved.throttle_limit, 7);
    }

    #[test]
    fn zero_override_rejected() {
        let overrides = Overrides {
            throttle_limit: Some(0),
            ..Overrides::default()
        };
        let err = resolve_diagnostics(&config(), Path::new("."), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn builder_carries_settings() {
        let resolved = resolve_diagnostics(&config(), Path::new("."), &Overrides::default())
            .unwrap();
        let agg = resolved.aggregator_builder().build().unwrap();
        assert_eq!(agg.threshold(), Severity::Warning);
        assert_eq!(agg.throttle_limit(), 50);
        assert_eq!(agg.listener_count(), 0);
    }
}
