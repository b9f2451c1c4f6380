//! Contract error types for the reporting module
//!
//! These errors are transport-agnostic and used for inter-module communication.

use std::collections::BTreeMap;
use std::fmt;

/// Field-level validation messages, keyed by form field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error
    pub fn into_result(self) -> Result<(), ReportingError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ReportingError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Reporting domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportingError {
    /// Entity not found
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// One or more form fields are missing or malformed
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// File extension has no parser
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Stored file could not be read or parsed
    #[error("Error parsing file: {message}")]
    Parse { message: String },

    /// Login rejected
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Storage or infrastructure failure; details are logged, not exposed
    #[error("Internal error")]
    Internal,
}

impl ReportingError {
    /// Validation error carrying a single field message
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
