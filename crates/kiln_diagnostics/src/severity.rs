//! Diagnostic severity levels ordered from least to most severe.

use crate::error::DiagnosticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Diagnostic`) to most severe (`Error`), matching the
/// derived `PartialOrd`/`Ord` implementation based on declaration order. Threshold
/// filtering in the aggregator compares with this ordering.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    /// Internal tracing output, only useful when debugging the toolchain itself.
    Diagnostic = 0,
    /// Detailed progress output.
    Verbose = 1,
    /// Ordinary progress and status messages.
    #[default]
    Info = 2,
    /// An improvement the author may want to make; not a problem.
    Suggestion = 3,
    /// A potential issue that should be reviewed but doesn't fail the build.
    Warning = 4,
    /// A definite problem that fails the build.
    Error = 5,
}

impl Severity {
    /// Every severity, in ascending order.
    pub const ALL: [Severity; 6] = [
        Severity::Diagnostic,
        Severity::Verbose,
        Severity::Info,
        Severity::Suggestion,
        Severity::Warning,
        Severity::Error,
    ];

    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// Returns the lowercase name used in display, config files and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Diagnostic => "diagnostic",
            Severity::Verbose => "verbose",
            Severity::Info => "info",
            Severity::Suggestion => "suggestion",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Severity {
        match raw {
            0 => Severity::Diagnostic,
            1 => Severity::Verbose,
            2 => Severity::Info,
            3 => Severity::Suggestion,
            4 => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DiagnosticsError::InvalidArgument(format!("unknown severity '{s}'")))
    }
}
