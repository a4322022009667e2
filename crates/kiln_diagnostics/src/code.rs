//! Diagnostic codes with category prefixes for structured identification.

use crate::error::DiagnosticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The build stage a diagnostic code belongs to, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `B101` for a build issue, `T203` for a template issue).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// General build orchestration, prefixed with `B`.
    Build,
    /// Configuration problems, prefixed with `C`.
    Config,
    /// Broken or suspicious cross references, prefixed with `L`.
    Link,
    /// Metadata extraction, prefixed with `M`.
    Metadata,
    /// Template rendering, prefixed with `T`.
    Template,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Build => 'B',
            Category::Config => 'C',
            Category::Link => 'L',
            Category::Metadata => 'M',
            Category::Template => 'T',
        }
    }

    /// Looks up the category for a prefix letter.
    pub fn from_prefix(prefix: char) -> Option<Category> {
        match prefix {
            'B' => Some(Category::Build),
            'C' => Some(Category::Config),
            'L' => Some(Category::Link),
            'M' => Some(Category::Metadata),
            'T' => Some(Category::Template),
            _ => None,
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `B101`, `L203`, `T042`. Serialized in the same text form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

impl FromStr for DiagnosticCode {
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || DiagnosticsError::InvalidArgument(format!("malformed diagnostic code '{s}'"));
        let mut chars = s.chars();
        let category = chars
            .next()
            .and_then(Category::from_prefix)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number = digits.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self::new(category, number))
    }
}

impl TryFrom<String> for DiagnosticCode {
    type Error = DiagnosticsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiagnosticCode> for String {
    fn from(code: DiagnosticCode) -> Self {
        code.to_string()
    }
}
