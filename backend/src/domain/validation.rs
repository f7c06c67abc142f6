//! Request validation contract.
//!
//! Request shapes implement [`Validate`] and report every violated field
//! constraint at once rather than stopping at the first.

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Aggregate of all violations found in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Structured form attached to HTTP error payloads.
    pub fn to_details(&self) -> Value {
        json!({ "fields": self.0 })
    }
}

impl From<Vec<FieldViolation>> for ValidationErrors {
    fn from(value: Vec<FieldViolation>) -> Self {
        Self(value)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

/// Implemented by request shapes that carry field constraints.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}
