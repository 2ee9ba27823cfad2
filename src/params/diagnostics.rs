//! Validation diagnostics.
//!
//! Validation never fails on a bad value; it substitutes a default or
//! drops a list entry and records what it did here.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::descriptor::Section;

/// What happened to a parameter during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The value was absent or falsy and the default was used
    Defaulted { default: Value },
    /// The value failed its check and was replaced by the default
    Invalid { value: Value, reason: String, default: Value },
    /// A list entry failed its check and was dropped
    Removed { entry: Value, reason: String },
}

/// One validation event for a `section -> key` parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub section: Section,
    pub key: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn defaulted(section: Section, key: &str, default: Value) -> Self {
        Self { section, key: key.to_string(), kind: DiagnosticKind::Defaulted { default } }
    }

    pub fn invalid(section: Section, key: &str, value: Value, reason: String, default: Value) -> Self {
        Self { section, key: key.to_string(), kind: DiagnosticKind::Invalid { value, reason, default } }
    }

    pub fn removed(section: Section, key: &str, entry: Value, reason: String) -> Self {
        Self { section, key: key.to_string(), kind: DiagnosticKind::Removed { entry, reason } }
    }

    /// True when a provided value was rejected, as opposed to simply missing
    pub fn is_correction(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::Defaulted { .. })
    }

    /// Log at `warn` for corrections and `debug` for substituted missing values
    pub fn log(&self) {
        if self.is_correction() {
            log::warn!("{}", self);
        } else {
            log::debug!("{}", self);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter [{} -> {}] ", self.section, self.key)?;
        match &self.kind {
            DiagnosticKind::Defaulted { default } => write!(f, "is missing (set to default: {})", default),
            DiagnosticKind::Invalid { value, reason, default } => {
                write!(f, "{} {} (set to default: {})", value, reason, default)
            }
            DiagnosticKind::Removed { entry, reason } => write!(f, "{} {} (removed)", entry, reason),
        }
    }
}
