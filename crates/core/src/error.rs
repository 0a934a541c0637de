//! The shared error taxonomy for the catalogue.
//!
//! Every layer speaks [`CoreError`]; the HTTP crate maps the variants onto
//! status codes, the import CLI onto exit codes.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a NotFound with any displayable key (id or slug).
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

/// Field-level validation messages, keyed by field name.
///
/// Serialises to `{"field": ["message", ...]}`. A `BTreeMap` keeps the
/// field order deterministic for both JSON output and log lines.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a one-field, one-message error set.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Append a message to a field, creating the field entry on first use.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when empty, otherwise a [`CoreError::Validation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_accumulates_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("name", "This field is required.");
        errors.push("name", "Must be unique.");
        errors.push("url", "Enter a valid URL.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": ["This field is required.", "Must be unique."],
                "url": ["Enter a valid URL."],
            })
        );
    }

    #[test]
    fn display_is_deterministic() {
        let mut errors = FieldErrors::new();
        errors.push("url", "Enter a valid URL.");
        errors.push("name", "This field is required.");
        assert_eq!(
            errors.to_string(),
            "name: This field is required.; url: Enter a valid URL."
        );
    }

    #[test]
    fn into_result_empty_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn into_result_nonempty_is_validation_error() {
        let errors = FieldErrors::single("name", "This field is required.");
        let err = errors.into_result().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
