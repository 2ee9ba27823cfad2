//! Single-parameter validation.
//!
//! Both functions are pure: they return the value to use together with the
//! diagnostics describing any substitution, and leave logging to the caller.

use serde_json::{Map, Value};

use super::descriptor::{is_falsy, Descriptor, Section};
use super::diagnostics::Diagnostic;

/// Validated value of one parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: Value,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fetch the descriptor value, falling back to the default when absent or falsy
fn lookup(descriptor: &Descriptor, section: Section, key: &str, defaults: &Map<String, Value>) -> (Value, Option<Diagnostic>) {
    let default = defaults.get(key).cloned().unwrap_or(Value::Null);
    match descriptor.get(section, key) {
        Some(value) if !is_falsy(value) => (value.clone(), None),
        _ => {
            let diagnostic = Diagnostic::defaulted(section, key, default.clone());
            (default, Some(diagnostic))
        }
    }
}

/// Validate a scalar parameter.
///
/// `check` returns the human-readable reason on rejection. A rejected value
/// is replaced by the default; a default is never itself re-checked.
pub fn get_parameter<F>(
    descriptor: &Descriptor,
    section: Section,
    key: &str,
    defaults: &Map<String, Value>,
    check: F,
) -> Resolution
where
    F: Fn(&Value) -> Result<(), String>,
{
    let (value, missing) = lookup(descriptor, section, key, defaults);
    if let Some(diagnostic) = missing {
        return Resolution { value, diagnostics: vec![diagnostic] };
    }

    match check(&value) {
        Ok(()) => Resolution { value, diagnostics: Vec::new() },
        Err(reason) => {
            let default = defaults.get(key).cloned().unwrap_or(Value::Null);
            Resolution {
                diagnostics: vec![Diagnostic::invalid(section, key, value, reason, default.clone())],
                value: default,
            }
        }
    }
}

/// Validate a list parameter entry by entry.
///
/// Entries failing `check_entry` are dropped individually. When every
/// entry is dropped the default list is used instead, since an empty list
/// would itself read as missing. A value that is not a list at all is
/// replaced by the default.
pub fn get_list_parameter<F>(
    descriptor: &Descriptor,
    section: Section,
    key: &str,
    defaults: &Map<String, Value>,
    check_entry: F,
) -> Resolution
where
    F: Fn(&Value) -> Result<(), String>,
{
    let (value, missing) = lookup(descriptor, section, key, defaults);
    if let Some(diagnostic) = missing {
        return Resolution { value, diagnostics: vec![diagnostic] };
    }

    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            let default = defaults.get(key).cloned().unwrap_or(Value::Null);
            return Resolution {
                diagnostics: vec![Diagnostic::invalid(section, key, other, "is not a list".to_string(), default.clone())],
                value: default,
            };
        }
    };

    let mut kept = Vec::with_capacity(entries.len());
    let mut diagnostics = Vec::new();
    for entry in entries {
        match check_entry(&entry) {
            Ok(()) => kept.push(entry),
            Err(reason) => diagnostics.push(Diagnostic::removed(section, key, entry, reason)),
        }
    }

    if kept.is_empty() {
        let default = defaults.get(key).cloned().unwrap_or(Value::Null);
        return Resolution { value: default, diagnostics };
    }

    Resolution { value: Value::Array(kept), diagnostics }
}
