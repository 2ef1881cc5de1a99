//! # Validator Module
//!
//! Rule-checking accumulator. Collects one message per field; the first
//! failure recorded for a field wins, later ones are dropped.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Minimum length of a short text value (names, titles, users)
pub const SHORT_TEXT_MIN: usize = 3;

/// Maximum length of a short text value
pub const SHORT_TEXT_MAX: usize = 50;

/// Field error accumulator.
///
/// # Examples
/// ```
/// use splitty_core::Validator;
///
/// let mut v = Validator::new();
/// v.check(1 + 1 == 2, "math", "broken");
/// v.check(false, "name", "must not be empty");
/// v.check(false, "name", "ignored, name already failed");
///
/// assert!(!v.valid());
/// assert_eq!(v.errors()["name"], "must not be empty");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no error has been recorded
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` under `key` unless the key already has an error
    pub fn add_error(&mut self, key: &str, message: impl Into<String>) {
        self.errors
            .entry(key.to_string())
            .or_insert_with(|| message.into());
    }

    /// Record `message` under `key` iff `ok` is false
    pub fn check(&mut self, ok: bool, key: &str, message: impl Into<String>) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

// ============================================================================
// Rule helpers
// ============================================================================

/// 3-50 characters of ASCII letters, digits, space, hyphen or underscore
pub fn is_short_text(value: &str) -> bool {
    let len = value.chars().count();
    (SHORT_TEXT_MIN..=SHORT_TEXT_MAX).contains(&len)
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_')
}

/// True iff no value appears twice
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}

/// True iff `value` is one of `list`
pub fn is_in<T: PartialEq>(value: &T, list: &[T]) -> bool {
    list.iter().any(|item| item == value)
}

/// True iff every value satisfies `f`
pub fn all<T>(values: &[T], f: impl Fn(&T) -> bool) -> bool {
    values.iter().all(f)
}
