//! Field-level validation failure.

use core::fmt;

/// A single field rejected by an entity's own validators.
///
/// The `reason` is client-facing text; `Display` renders only the reason so
/// it can be returned verbatim in an API error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationError {
    /// Name of the offending field as it appears in the JSON payload.
    pub field: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl FieldValidationError {
    /// Create a new field validation error.
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for FieldValidationError {}
