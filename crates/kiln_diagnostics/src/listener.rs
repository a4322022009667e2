//! The capability every diagnostic consumer implements.

use crate::diagnostic::Diagnostic;
use crate::error::ListenerError;

/// A consumer of dispatched diagnostics (console, file, in-memory collector, ...).
///
/// Listeners are called synchronously on whichever thread logged the
/// diagnostic, so implementations must be `Send + Sync` and do their own
/// locking. Errors and panics are caught by the registry and reported as
/// [`ListenerFailure`](crate::ListenerFailure)s; they never reach the caller
/// of [`Aggregator::log`](crate::Aggregator::log).
pub trait DiagnosticListener: Send + Sync {
    /// Accepts one diagnostic.
    fn accept(&self, diagnostic: &Diagnostic) -> Result<(), ListenerError>;

    /// Flushes any buffered state. The default does nothing.
    fn flush(&self) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Returns the name used in failure reports and for lookup.
    ///
    /// The default uses `type_name::<Self>()`; override it with something short.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
