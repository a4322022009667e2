//! Listener that renders diagnostics to a terminal stream.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::diagnostic::Diagnostic;
use crate::error::ListenerError;
use crate::listener::DiagnosticListener;
use crate::renderer::{DiagnosticRenderer, TerminalRenderer};
use crate::severity::Severity;

/// Writes each diagnostic through a [`DiagnosticRenderer`] to a stream.
///
/// Defaults to stderr with the [`TerminalRenderer`]. Diagnostics below
/// `min_severity` are ignored by this listener only.
pub struct ConsoleListener {
    renderer: Box<dyn DiagnosticRenderer>,
    out: Mutex<Box<dyn Write + Send>>,
    min_severity: Severity,
    name: String,
}

impl ConsoleListener {
    /// Creates a listener writing to stderr.
    pub fn stderr(color: bool) -> Self {
        Self::with_writer(Box::new(TerminalRenderer::new(color)), Box::new(io::stderr()))
    }

    /// Creates a listener with a custom renderer and output stream.
    pub fn with_writer(renderer: Box<dyn DiagnosticRenderer>, out: Box<dyn Write + Send>) -> Self {
        Self {
            renderer,
            out: Mutex::new(out),
            min_severity: Severity::Diagnostic,
            name: "console".to_string(),
        }
    }

    /// Ignores diagnostics below `severity`.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Overrides the default name `"console"`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl DiagnosticListener for ConsoleListener {
    fn accept(&self, diagnostic: &Diagnostic) -> Result<(), ListenerError> {
        if diagnostic.severity < self.min_severity {
            return Ok(());
        }
        let rendered = self.renderer.render(diagnostic);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{rendered}")?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// A cloneable in-memory writer so tests can read back what was written.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn plain(buf: &SharedBuf) -> ConsoleListener {
        ConsoleListener::with_writer(Box::new(TerminalRenderer::new(false)), Box::new(buf.clone()))
    }

    #[test]
    fn writes_rendered_lines() {
        let buf = SharedBuf::default();
        let console = plain(&buf);
        console.accept(&Diagnostic::warning("w1")).unwrap();
        console.accept(&Diagnostic::error("e1")).unwrap();
        console.flush().unwrap();
        assert_eq!(buf.contents(), "warning: w1\nerror: e1\n");
        assert_eq!(console.name(), "console");
    }

    #[test]
    fn min_severity_filters() {
        let buf = SharedBuf::default();
        let console = plain(&buf).with_min_severity(Severity::Warning);
        console.accept(&Diagnostic::info("quiet")).unwrap();
        console.accept(&Diagnostic::warning("loud")).unwrap();
        assert_eq!(buf.contents(), "warning: loud\n");
    }

    #[test]
    fn write_failure_is_reported() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let console =
            ConsoleListener::with_writer(Box::new(TerminalRenderer::new(false)), Box::new(Broken));
        let err = console.accept(&Diagnostic::error("lost")).unwrap_err();
        assert!(matches!(err, ListenerError::Io(_)));
    }
}
