//! Listener that appends diagnostics to a JSON-lines file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::diagnostic::Diagnostic;
use crate::error::ListenerError;
use crate::listener::DiagnosticListener;

/// Writes one JSON object per diagnostic to a buffered file.
///
/// Output is buffered; call [`flush`](DiagnosticListener::flush) (or
/// [`Aggregator::flush`](crate::Aggregator::flush)) before reading the file.
pub struct JsonLinesListener {
    path: PathBuf,
    out: Mutex<BufWriter<File>>,
    name: String,
}

impl JsonLinesListener {
    /// Creates (or truncates) the file at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        Ok(Self {
            path,
            out: Mutex::new(BufWriter::new(file)),
            name: "json-file".to_string(),
        })
    }

    /// Overrides the default name `"json-file"`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticListener for JsonLinesListener {
    fn accept(&self, diagnostic: &Diagnostic) -> Result<(), ListenerError> {
        let line = serde_json::to_string(diagnostic)?;
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<(), ListenerError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
