use std::fmt;

use crate::kind::ViolationKind;

/// A single field-level validation failure.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ViolationKind,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(kind: ViolationKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the most common case, a missing field.
    pub fn required(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Required, field, message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.kind, self.message)
    }
}
