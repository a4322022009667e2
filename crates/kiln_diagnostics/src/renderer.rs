//! Diagnostic rendering backends for human-readable and machine-readable output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
///
/// Implementations format diagnostics for different output targets:
/// terminal (human-readable) and JSON lines (machine-readable).
pub trait DiagnosticRenderer: Send + Sync {
    /// Renders a single diagnostic into a formatted string without a trailing newline.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[L101]: broken link to 'api/foo.md'
///   --> docs/index.md:12
///    = phase: build
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let ansi = match severity {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
            Severity::Suggestion => "1;36",
            Severity::Info => "1;32",
            Severity::Verbose | Severity::Diagnostic => "2",
        };
        format!("\x1b[{ansi}m{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        // Header line: severity[CODE]: message
        let label = match diag.code {
            Some(code) => format!("{}[{}]", diag.severity, code),
            None => diag.severity.to_string(),
        };
        let mut out = format!("{}: {}", self.paint(diag.severity, &label), diag.message);

        if let Some(location) = diag.location() {
            out.push_str(&format!("\n  --> {location}"));
        }
        if let Some(phase) = &diag.phase {
            out.push_str(&format!("\n   = phase: {phase}"));
        }
        out
    }
}

/// Renders each diagnostic as one line of compact JSON.
#[derive(Default)]
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        // Serializing plain strings, integers and enums cannot fail.
        serde_json::to_string(diag).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_with_code_and_location() {
        let diag = Diagnostic::warning("broken link to 'api/foo.md'")
            .with_code(DiagnosticCode::new(Category::Link, 101))
            .with_file("docs/index.md")
            .with_line(12);

        let output = TerminalRenderer::new(false).render(&diag);

        assert_eq!(
            output,
            "warning[L101]: broken link to 'api/foo.md'\n  --> docs/index.md:12"
        );
    }

    #[test]
    fn render_phase_footer() {
        let diag = Diagnostic::error("template not found").with_phase("render");
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.starts_with("error: template not found"));
        assert!(output.contains("= phase: render"));
        assert!(!output.contains("-->"));
    }

    #[test]
    fn render_colored_header() {
        let diag = Diagnostic::error("boom");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;31merror\x1b[0m: boom"));
    }

    #[test]
    fn render_json_line() {
        let diag = Diagnostic::info("copied 3 files").with_file("static/");
        let output = JsonRenderer.render(&diag);
        assert!(!output.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["severity"], "info");
        assert_eq!(value["file"], "static/");
    }
}
