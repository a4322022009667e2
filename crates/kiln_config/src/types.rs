//! Configuration types deserialized from `kiln.toml`.

use kiln_diagnostics::{Severity, DEFAULT_THROTTLE_LIMIT};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level configuration parsed from `kiln.toml`.
///
/// Only the `[diagnostics]` section is interpreted here; other sections belong
/// to the build pipeline and are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct KilnConfig {
    /// Diagnostic reporting settings.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// The `[diagnostics]` section.
#[derive(Debug, Deserialize)]
pub struct DiagnosticsConfig {
    /// Minimum severity that is counted and reported.
    #[serde(default = "default_threshold", deserialize_with = "deserialize_severity")]
    pub threshold: Severity,
    /// Whether warnings fail the build.
    #[serde(default)]
    pub warnings_as_errors: bool,
    /// Number of warnings reported before further warnings are suppressed.
    #[serde(default = "default_throttle_limit")]
    pub throttle_limit: usize,
    /// The listeners to attach, in dispatch order.
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            warnings_as_errors: false,
            throttle_limit: default_throttle_limit(),
            listeners: Vec::new(),
        }
    }
}

/// One `[[diagnostics.listeners]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    /// Listener kind: `console`, `json-file` or `memory`.
    pub kind: String,
    /// Output path, required for `json-file`; relative to the project directory.
    #[serde(default)]
    pub path: Option<String>,
    /// Per-listener severity floor.
    #[serde(default, deserialize_with = "deserialize_opt_severity")]
    pub min_severity: Option<Severity>,
    /// Whether a console listener uses ANSI colors. Defaults to the CLI setting.
    #[serde(default)]
    pub color: Option<bool>,
    /// Name reported in listener failure logs.
    #[serde(default)]
    pub name: Option<String>,
}

/// The recognized listener kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ListenerKind {
    /// Rendered text on stderr.
    Console,
    /// JSON lines written to a file.
    JsonFile,
    /// In-memory collection (useful for embedding and tests).
    Memory,
}

impl ListenerKind {
    /// Parses the `kind` string of a listener entry.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "console" => Some(ListenerKind::Console),
            "json-file" => Some(ListenerKind::JsonFile),
            "memory" => Some(ListenerKind::Memory),
            _ => None,
        }
    }
}

fn default_threshold() -> Severity {
    Severity::Info
}

fn default_throttle_limit() -> usize {
    DEFAULT_THROTTLE_LIMIT
}

struct SeverityVisitor;

impl<'de> Visitor<'de> for SeverityVisitor {
    type Value = Severity;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(
            "a severity name (diagnostic, verbose, info, suggestion, warning, error)",
        )
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

/// Deserializes a severity name case-insensitively.
fn deserialize_severity<'de, D>(deserializer: D) -> Result<Severity, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(SeverityVisitor)
}

fn deserialize_opt_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_severity(deserializer).map(Some)
}
