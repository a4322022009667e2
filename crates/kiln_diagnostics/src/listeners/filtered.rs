//! Per-listener severity floor.

use std::sync::Arc;

use crate::diagnostic::Diagnostic;
use crate::error::ListenerError;
use crate::listener::DiagnosticListener;
use crate::severity::Severity;

/// Forwards only diagnostics at or above `min_severity` to the wrapped listener.
///
/// This is independent of the aggregator threshold: the aggregator decides what
/// is counted and dispatched at all, the filter decides what one listener sees.
pub struct FilteredListener {
    inner: Arc<dyn DiagnosticListener>,
    min_severity: Severity,
}

impl FilteredListener {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn DiagnosticListener>, min_severity: Severity) -> Self {
        Self {
            inner,
            min_severity,
        }
    }
}

impl DiagnosticListener for FilteredListener {
    fn accept(&self, diagnostic: &Diagnostic) -> Result<(), ListenerError> {
        if diagnostic.severity < self.min_severity {
            return Ok(());
        }
        self.inner.accept(diagnostic)
    }

    fn flush(&self) -> Result<(), ListenerError> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
