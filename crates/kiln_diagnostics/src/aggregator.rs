//! The build-wide diagnostic aggregator.
//!
//! One [`Aggregator`] is constructed per build run and shared (usually behind an
//! `Arc`) by every stage that reports diagnostics. It applies the severity
//! threshold, counts warnings and errors, caps how many warnings reach the
//! listeners, and tracks whether the run has failed.
//!
//! ## Rules
//! - Below-threshold diagnostics are a complete no-op.
//! - Every warning is counted; only the first `throttle_limit` are dispatched.
//!   The limit-th warning is preceded by one "too many warnings" sentinel.
//! - Errors are counted and always dispatched; they fail the run. So do
//!   warnings while warnings-as-errors is on.
//! - The failed flag never resets. Construct a new aggregator for a new run.
//! - Listener failures are isolated, logged through `tracing` and counted; they
//!   never reach the caller and never touch the warning/error counters.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::diagnostic::Diagnostic;
use crate::error::{DiagnosticsError, ListenerFailure};
use crate::listener::DiagnosticListener;
use crate::registry::{ListenerHandle, ListenerRegistry};
use crate::severity::Severity;
use crate::summary::BuildSummary;

/// Number of warnings dispatched before further warnings are suppressed.
pub const DEFAULT_THROTTLE_LIMIT: usize = 10_000;

/// Returns the synthetic warning dispatched once when `limit` warnings are reached.
pub fn throttle_sentinel(limit: usize) -> Diagnostic {
    Diagnostic::warning(format!(
        "Too many warnings (limit {limit} reached); further warnings are suppressed."
    ))
}

/// Thread-safe, severity-classified diagnostic aggregator with fan-out to listeners.
#[derive(Debug)]
pub struct Aggregator {
    threshold: AtomicU8,
    warnings_as_errors: AtomicBool,
    warning_count: AtomicUsize,
    error_count: AtomicUsize,
    failed: AtomicBool,
    listener_failures: AtomicUsize,
    throttle_limit: usize,
    registry: ListenerRegistry,
}

impl Aggregator {
    /// Creates an aggregator with threshold `Info`, warnings-as-errors off and the
    /// default throttle limit.
    pub fn new() -> Self {
        Self::with_settings(Severity::Info, false, DEFAULT_THROTTLE_LIMIT)
    }

    /// Starts building an aggregator with non-default settings.
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    fn with_settings(threshold: Severity, warnings_as_errors: bool, throttle_limit: usize) -> Self {
        Self {
            threshold: AtomicU8::new(threshold as u8),
            warnings_as_errors: AtomicBool::new(warnings_as_errors),
            warning_count: AtomicUsize::new(0),
            error_count: AtomicUsize::new(0),
            failed: AtomicBool::new(false),
            listener_failures: AtomicUsize::new(0),
            throttle_limit,
            registry: ListenerRegistry::new(),
        }
    }

    // --- logging -----------------------------------------------------------

    /// Logs one diagnostic.
    ///
    /// This is the single entry point every helper funnels into. It never fails:
    /// threshold and throttle decisions are silent, and listener failures are
    /// absorbed.
    pub fn log(&self, diagnostic: Diagnostic) {
        if diagnostic.severity < self.threshold() {
            return;
        }

        match diagnostic.severity {
            Severity::Warning => {
                let n = self.warning_count.fetch_add(1, Ordering::Relaxed) + 1;
                if self.warnings_as_errors() {
                    self.failed.store(true, Ordering::Relaxed);
                }
                if n > self.throttle_limit {
                    return;
                }
                if n == self.throttle_limit {
                    tracing::debug!(limit = self.throttle_limit, "warning throttle limit reached");
                    self.dispatch(&throttle_sentinel(self.throttle_limit));
                }
            }
            Severity::Error => {
                self.failed.store(true, Ordering::Relaxed);
                self.error_count.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        self.dispatch(&diagnostic);
    }

    /// Logs a message at the given severity with no location.
    pub fn log_at(&self, severity: Severity, message: impl Into<String>) {
        self.log(Diagnostic::new(severity, message));
    }

    /// Logs a [`Severity::Diagnostic`] message.
    pub fn diagnostic(&self, message: impl Into<String>) {
        self.log_at(Severity::Diagnostic, message);
    }

    /// Logs a [`Severity::Verbose`] message.
    pub fn verbose(&self, message: impl Into<String>) {
        self.log_at(Severity::Verbose, message);
    }

    /// Logs a [`Severity::Info`] message.
    pub fn info(&self, message: impl Into<String>) {
        self.log_at(Severity::Info, message);
    }

    /// Logs a [`Severity::Suggestion`] message.
    pub fn suggestion(&self, message: impl Into<String>) {
        self.log_at(Severity::Suggestion, message);
    }

    /// Logs a [`Severity::Warning`] message.
    pub fn warning(&self, message: impl Into<String>) {
        self.log_at(Severity::Warning, message);
    }

    /// Logs a [`Severity::Error`] message.
    pub fn error(&self, message: impl Into<String>) {
        self.log_at(Severity::Error, message);
    }

    /// Flushes every registered listener.
    pub fn flush(&self) {
        let failures = self.registry.flush_all();
        self.record_failures(failures);
    }

    fn dispatch(&self, diagnostic: &Diagnostic) {
        let failures = self.registry.dispatch(diagnostic);
        self.record_failures(failures);
    }

    fn record_failures(&self, failures: Vec<ListenerFailure>) {
        for failure in failures {
            self.listener_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                listener = %failure.listener,
                handle = %failure.handle,
                operation = %failure.operation,
                cause = %failure.cause,
                "diagnostic listener failed"
            );
        }
    }

    // --- listeners ---------------------------------------------------------

    /// Registers a listener; it receives every diagnostic dispatched from now on.
    pub fn register_listener(&self, listener: Arc<dyn DiagnosticListener>) -> ListenerHandle {
        self.registry.add(listener)
    }

    /// Unregisters a listener. Returns `false` if the handle was not registered.
    pub fn unregister_listener(&self, handle: ListenerHandle) -> bool {
        self.registry.remove(handle)
    }

    /// Unregisters every listener. Counting continues; dispatches go nowhere.
    pub fn unregister_all(&self) {
        self.registry.remove_all();
    }

    /// Returns the first registered listener matching `predicate`.
    pub fn find_listener<P>(&self, predicate: P) -> Option<Arc<dyn DiagnosticListener>>
    where
        P: FnMut(&dyn DiagnosticListener) -> bool,
    {
        self.registry.find(predicate)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    // --- knobs and counters ------------------------------------------------

    /// The minimum severity that is counted and dispatched.
    pub fn threshold(&self) -> Severity {
        Severity::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    /// Changes the threshold for subsequent calls.
    pub fn set_threshold(&self, threshold: Severity) {
        self.threshold.store(threshold as u8, Ordering::Relaxed);
    }

    /// Whether warnings also fail the run.
    pub fn warnings_as_errors(&self) -> bool {
        self.warnings_as_errors.load(Ordering::Relaxed)
    }

    /// Turns warnings-as-errors on or off for subsequent calls.
    pub fn set_warnings_as_errors(&self, enabled: bool) {
        self.warnings_as_errors.store(enabled, Ordering::Relaxed);
    }

    /// Warnings logged at or above the threshold, including throttled ones.
    pub fn warning_count(&self) -> usize {
        self.warning_count.load(Ordering::Relaxed)
    }

    /// Errors logged at or above the threshold.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// `true` once an error (or a warning under warnings-as-errors) was logged.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    /// Number of warnings dispatched before suppression starts.
    pub fn throttle_limit(&self) -> usize {
        self.throttle_limit
    }

    /// Listener failures absorbed so far.
    pub fn listener_failure_count(&self) -> usize {
        self.listener_failures.load(Ordering::Relaxed)
    }

    // --- summary -----------------------------------------------------------

    /// Snapshot of the counters and failure state.
    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            warnings: self.warning_count(),
            errors: self.error_count(),
            failed: self.has_failed(),
        }
    }

    /// Writes the summary report to `out`.
    pub fn write_summary(&self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self.summary())
    }

    /// Prints the summary report to stderr.
    pub fn print_summary(&self) {
        eprint!("{}", self.summary());
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for an [`Aggregator`] with custom settings and initial listeners.
pub struct AggregatorBuilder {
    threshold: Severity,
    warnings_as_errors: bool,
    throttle_limit: usize,
    listeners: Vec<Arc<dyn DiagnosticListener>>,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self {
            threshold: Severity::Info,
            warnings_as_errors: false,
            throttle_limit: DEFAULT_THROTTLE_LIMIT,
            listeners: Vec::new(),
        }
    }
}

impl AggregatorBuilder {
    /// Sets the initial severity threshold.
    pub fn threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the initial warnings-as-errors flag.
    pub fn warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }

    /// Sets the warning throttle limit. Must be at least 1.
    pub fn throttle_limit(mut self, limit: usize) -> Self {
        self.throttle_limit = limit;
        self
    }

    /// Registers a listener when the aggregator is built.
    pub fn listener(mut self, listener: Arc<dyn DiagnosticListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Builds the aggregator.
    ///
    /// Fails with [`DiagnosticsError::InvalidArgument`] if the throttle limit is zero.
    pub fn build(self) -> Result<Aggregator, DiagnosticsError> {
        if self.throttle_limit == 0 {
            return Err(DiagnosticsError::InvalidArgument(
                "throttle limit must be at least 1".to_string(),
            ));
        }
        let aggregator =
            Aggregator::with_settings(self.threshold, self.warnings_as_errors, self.throttle_limit);
        for listener in self.listeners {
            aggregator.register_listener(listener);
        }
        Ok(aggregator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;
    use crate::listeners::MemoryListener;

    fn with_memory(builder: AggregatorBuilder) -> (Aggregator, Arc<MemoryListener>) {
        let mem = Arc::new(MemoryListener::new());
        let agg = builder.listener(mem.clone()).build().unwrap();
        (agg, mem)
    }

    #[test]
    fn defaults() {
        let agg = Aggregator::new();
        assert_eq!(agg.threshold(), Severity::Info);
        assert!(!agg.warnings_as_errors());
        assert_eq!(agg.throttle_limit(), DEFAULT_THROTTLE_LIMIT);
        assert_eq!(agg.warning_count(), 0);
        assert_eq!(agg.error_count(), 0);
        assert!(!agg.has_failed());
        assert_eq!(agg.listener_count(), 0);
    }

    #[test]
    fn zero_throttle_limit_rejected() {
        let err = Aggregator::builder().throttle_limit(0).build().unwrap_err();
        assert!(matches!(err, DiagnosticsError::InvalidArgument(_)));
    }

    #[test]
    fn below_threshold_is_noop() {
        let (agg, mem) = with_memory(Aggregator::builder());
        agg.diagnostic("trace");
        agg.verbose("detail");
        assert!(mem.is_empty());

        agg.set_threshold(Severity::Error);
        agg.warning("ignored");
        assert_eq!(agg.warning_count(), 0);
        assert!(!agg.has_failed());
        assert!(mem.is_empty());
    }

    #[test]
    fn helpers_fix_severity() {
        let (agg, mem) = with_memory(Aggregator::builder().threshold(Severity::Diagnostic));
        agg.diagnostic("a");
        agg.verbose("b");
        agg.info("c");
        agg.suggestion("d");
        agg.warning("e");
        agg.error("f");
        let seen: Vec<Severity> = mem.diagnostics().iter().map(|d| d.severity).collect();
        assert_eq!(seen, Severity::ALL.to_vec());
    }

    #[test]
    fn error_fails_run() {
        let (agg, mem) = with_memory(Aggregator::builder());
        agg.error("build failed");
        assert_eq!(agg.error_count(), 1);
        assert!(agg.has_failed());
        assert_eq!(mem.count(Severity::Error), 1);
    }

    #[test]
    fn warnings_as_errors_fails_without_counting_error() {
        let agg = Aggregator::new();
        agg.set_warnings_as_errors(true);
        agg.warning("deprecated syntax");
        assert_eq!(agg.warning_count(), 1);
        assert_eq!(agg.error_count(), 0);
        assert!(agg.has_failed());
    }

    #[test]
    fn failed_is_sticky() {
        let agg = Aggregator::new();
        agg.error("boom");
        agg.set_threshold(Severity::Error);
        agg.set_warnings_as_errors(false);
        agg.info("fine");
        assert!(agg.has_failed());
    }

    #[test]
    fn throttle_emits_sentinel_once_then_drops() {
        let (agg, mem) = with_memory(Aggregator::builder().throttle_limit(3));
        for i in 1..=5 {
            agg.warning(format!("w{i}"));
        }
        assert_eq!(agg.warning_count(), 5);

        let messages: Vec<String> = mem.diagnostics().into_iter().map(|d| d.message).collect();
        assert_eq!(
            messages,
            vec![
                "w1".to_string(),
                "w2".to_string(),
                throttle_sentinel(3).message,
                "w3".to_string(),
            ]
        );
    }

    #[test]
    fn errors_are_never_throttled() {
        let (agg, mem) = with_memory(Aggregator::builder().throttle_limit(1));
        agg.warning("w1");
        agg.warning("w2");
        for _ in 0..5 {
            agg.error("e");
        }
        assert_eq!(agg.error_count(), 5);
        assert_eq!(mem.count(Severity::Error), 5);
        // sentinel + w1
        assert_eq!(mem.count(Severity::Warning), 2);
    }

    #[test]
    fn unregister_all_keeps_counting() {
        let (agg, mem) = with_memory(Aggregator::builder());
        agg.unregister_all();
        agg.warning("w");
        agg.error("e");
        assert_eq!(agg.warning_count(), 1);
        assert_eq!(agg.error_count(), 1);
        assert!(mem.is_empty());
    }

    #[test]
    fn register_and_unregister() {
        let agg = Aggregator::new();
        let mem = Arc::new(MemoryListener::named("collector"));
        let handle = agg.register_listener(mem.clone());
        agg.info("one");
        assert!(agg.find_listener(|l| l.name() == "collector").is_some());

        assert!(agg.unregister_listener(handle));
        assert!(!agg.unregister_listener(handle));
        agg.info("two");
        assert_eq!(mem.len(), 1);
        assert!(agg.find_listener(|l| l.name() == "collector").is_none());
    }

    #[test]
    fn listener_failure_is_absorbed() {
        struct Broken;

        impl DiagnosticListener for Broken {
            fn accept(&self, _: &Diagnostic) -> Result<(), ListenerError> {
                Err(ListenerError::Rejected("disk full".into()))
            }

            fn flush(&self) -> Result<(), ListenerError> {
                Err(ListenerError::Rejected("disk full".into()))
            }
        }

        let mem = Arc::new(MemoryListener::new());
        let agg = Aggregator::builder()
            .listener(Arc::new(Broken))
            .listener(mem.clone())
            .build()
            .unwrap();

        agg.warning("still delivered");
        agg.flush();

        assert_eq!(mem.len(), 1);
        assert_eq!(mem.flush_count(), 1);
        assert_eq!(agg.warning_count(), 1);
        assert_eq!(agg.error_count(), 0);
        assert!(!agg.has_failed());
        assert_eq!(agg.listener_failure_count(), 2);
    }

    #[test]
    fn summary_reflects_counters() {
        let agg = Aggregator::new();
        agg.warning("w");
        agg.warning("w");
        let summary = agg.summary();
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.errors, 0);
        assert!(!summary.failed);

        let mut out = Vec::new();
        agg.write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Build succeeded with warnings."));
        assert!(text.contains("2 warning(s)"));
        // Reading the summary mutates nothing.
        assert_eq!(agg.warning_count(), 2);
    }
}
