//! Shared helpers for CLI commands.
//!
//! Project root resolution and turning resolved listener settings into live
//! [`DiagnosticListener`]s.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_config::{ListenerKind, ResolvedDiagnostics, ResolvedListener, CONFIG_FILE};
use kiln_diagnostics::listeners::{
    ConsoleListener, FilteredListener, JsonLinesListener, MemoryListener,
};
use kiln_diagnostics::{DiagnosticListener, JsonRenderer, Severity};

use crate::{GlobalArgs, ReportFormat};

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
///
/// Returns the directory containing `kiln.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `kiln.toml`, and
/// falls back to the current directory when there is none.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        let cwd = std::env::current_dir()?;
        Ok(find_project_root(&cwd).unwrap_or(cwd))
    }
}

/// The configuration file named by `--config`, if any.
///
/// A directory names the `kiln.toml` inside it; anything else is taken as the
/// file itself, whether or not it exists.
pub fn explicit_config_file(global: &GlobalArgs) -> Option<PathBuf> {
    let path = PathBuf::from(global.config.as_ref()?);
    if path.is_dir() {
        Some(path.join(CONFIG_FILE))
    } else {
        Some(path)
    }
}

/// Instantiates the listeners named in `resolved`, in order.
///
/// With no configured listeners a single console listener is used. `--quiet`
/// restricts that default console to errors.
pub fn build_listeners(
    resolved: &ResolvedDiagnostics,
    format: ReportFormat,
    global: &GlobalArgs,
) -> io::Result<Vec<Arc<dyn DiagnosticListener>>> {
    if resolved.listeners.is_empty() {
        let floor = if global.quiet {
            Severity::Error
        } else {
            Severity::Diagnostic
        };
        let console = console_listener(format, global.color).with_min_severity(floor);
        return Ok(vec![Arc::new(console)]);
    }

    resolved
        .listeners
        .iter()
        .map(|entry| build_listener(entry, format, global))
        .collect()
}

fn build_listener(
    entry: &ResolvedListener,
    format: ReportFormat,
    global: &GlobalArgs,
) -> io::Result<Arc<dyn DiagnosticListener>> {
    let listener: Arc<dyn DiagnosticListener> = match entry.kind {
        ListenerKind::Console => {
            let mut console = console_listener(format, entry.color.unwrap_or(global.color));
            if let Some(name) = &entry.name {
                console = console.with_name(name.clone());
            }
            Arc::new(console)
        }
        ListenerKind::JsonFile => {
            // Validated by kiln_config: json-file entries always carry a path.
            let path = entry.path.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "json-file listener without a path")
            })?;
            let mut file = JsonLinesListener::create(path)?;
            if let Some(name) = &entry.name {
                file = file.with_name(name.clone());
            }
            Arc::new(file)
        }
        ListenerKind::Memory => Arc::new(MemoryListener::named(
            entry.name.clone().unwrap_or_else(|| "memory".to_string()),
        )),
    };

    Ok(match entry.min_severity {
        Some(floor) => Arc::new(FilteredListener::new(listener, floor)),
        None => listener,
    })
}

fn console_listener(format: ReportFormat, color: bool) -> ConsoleListener {
    match format {
        ReportFormat::Text => ConsoleListener::stderr(color),
        ReportFormat::Json => {
            ConsoleListener::with_writer(Box::new(JsonRenderer), Box::new(io::stdout()))
        }
    }
}
