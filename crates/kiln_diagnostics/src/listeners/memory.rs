//! Thread-safe in-memory diagnostic collector.

use crate::diagnostic::Diagnostic;
use crate::error::ListenerError;
use crate::listener::DiagnosticListener;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A listener that keeps every diagnostic it receives.
///
/// Multiple threads can deliver diagnostics concurrently. The flush count is
/// tracked atomically so tests can check flushes without locking the vector.
pub struct MemoryListener {
    name: String,
    diagnostics: Mutex<Vec<Diagnostic>>,
    flush_count: AtomicUsize,
}

impl MemoryListener {
    /// Creates a new empty collector named `"memory"`.
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Creates a new empty collector with a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diagnostics: Mutex::new(Vec::new()),
            flush_count: AtomicUsize::new(0),
        }
    }

    /// Takes all collected diagnostics, leaving the collector empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.lock();
        std::mem::take(&mut *diagnostics)
    }

    /// Returns a snapshot of all collected diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Returns the number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns how many collected diagnostics have the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.lock().iter().filter(|d| d.severity == severity).count()
    }

    /// Returns how many times [`flush`](DiagnosticListener::flush) was called.
    pub fn flush_count(&self) -> usize {
        self.flush_count.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryListener {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticListener for MemoryListener {
    fn accept(&self, diagnostic: &Diagnostic) -> Result<(), ListenerError> {
        self.lock().push(diagnostic.clone());
        Ok(())
    }

    fn flush(&self) -> Result<(), ListenerError> {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
