//! End-of-run summary report.

use std::fmt;

/// Final counts of a build run, as read from an [`Aggregator`](crate::Aggregator).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BuildSummary {
    /// Warnings logged, including throttled ones.
    pub warnings: usize,
    /// Errors logged.
    pub errors: usize,
    /// Whether the run failed.
    pub failed: bool,
}

impl BuildSummary {
    /// The one-line pass/warn/fail headline.
    pub fn headline(&self) -> &'static str {
        if self.failed {
            "Build failed."
        } else if self.warnings > 0 {
            "Build succeeded with warnings."
        } else {
            "Build succeeded."
        }
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline())?;
        writeln!(f, "    {} warning(s)", self.warnings)?;
        writeln!(f, "    {} error(s)", self.errors)
    }
}
