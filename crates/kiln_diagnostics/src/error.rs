//! Error types for the diagnostics subsystem.

use crate::registry::ListenerHandle;

/// Errors returned synchronously to callers of the diagnostics API.
///
/// Returning one of these never leaves partially mutated state behind.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors a [`DiagnosticListener`](crate::DiagnosticListener) may report from
/// `accept` or `flush`.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Writing to the listener's output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the diagnostic failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The listener refused the diagnostic for its own reasons.
    #[error("{0}")]
    Rejected(String),
}

/// The listener operation that failed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ListenerOperation {
    /// [`DiagnosticListener::accept`](crate::DiagnosticListener::accept).
    Accept,
    /// [`DiagnosticListener::flush`](crate::DiagnosticListener::flush).
    Flush,
}

impl std::fmt::Display for ListenerOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerOperation::Accept => f.write_str("accept"),
            ListenerOperation::Flush => f.write_str("flush"),
        }
    }
}

/// A single listener that failed while a diagnostic or flush was being dispatched.
///
/// Failures are collected by the registry and handed back to the caller instead
/// of being propagated, so one broken listener cannot stop the others.
#[derive(Clone, Debug, thiserror::Error)]
#[error("listener '{listener}' failed to {operation}: {cause}")]
pub struct ListenerFailure {
    /// The registration that failed.
    pub handle: ListenerHandle,
    /// The listener's reported name.
    pub listener: String,
    /// Which operation failed.
    pub operation: ListenerOperation,
    /// The rendered error or panic payload.
    pub cause: String,
}
