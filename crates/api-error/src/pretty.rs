//! Structured, log-friendly views of errors.
//!
//! Gated behind the `serde` feature. The serialized shape of a
//! [`StructuredError`] is the API response body:
//!
//! ```json
//! {"type": "UNPROCESSABLE_ENTITY", "code": 422, "message": "Unprocessable entity",
//!  "violations": [{"type": "REQUIRED", "field": "email", "message": "Email is required"}]}
//! ```
//!
//! `violations` and `stack_traces` are left out when empty; the cause is never
//! serialized.

#![cfg(feature = "serde")]

use serde::Serialize;

use crate::structured::StructuredError;
use crate::violation::ValidationIssue;

/// Provide a structured view of an error for logging or a response body.
pub trait PrettyDebug {
    type Fields<'a>: Serialize + 'a
    where
        Self: 'a;

    fn fields(&self) -> Self::Fields<'_>;

    fn to_value(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self.fields()).ok()
    }

    /// Compact JSON, suitable as a response body.
    fn to_json(&self) -> Option<String> {
        serde_json::to_string(&self.fields()).ok()
    }

    fn pretty_json(&self) -> Option<String> {
        serde_json::to_string_pretty(&self.fields()).ok()
    }

    /// Emit a tracing event carrying both the Display string and the JSON view.
    #[cfg(feature = "tracing")]
    fn emit_tracing(&self, level: tracing::Level, message: &str)
    where
        Self: std::fmt::Display,
    {
        let rendered = self.to_string();
        let json = self.to_json().unwrap_or_default();
        macro_rules! at {
            ($lvl:expr) => {
                tracing::event!($lvl, error = %rendered, fields = %json, "{}", message)
            };
        }
        match level {
            tracing::Level::ERROR => at!(tracing::Level::ERROR),
            tracing::Level::WARN => at!(tracing::Level::WARN),
            tracing::Level::INFO => at!(tracing::Level::INFO),
            tracing::Level::DEBUG => at!(tracing::Level::DEBUG),
            _ => at!(tracing::Level::TRACE),
        }
    }
}

impl PrettyDebug for StructuredError {
    type Fields<'a> = &'a StructuredError;

    fn fields(&self) -> Self::Fields<'_> {
        self
    }
}

impl PrettyDebug for ValidationIssue {
    type Fields<'a> = &'a ValidationIssue;

    fn fields(&self) -> Self::Fields<'_> {
        self
    }
}
