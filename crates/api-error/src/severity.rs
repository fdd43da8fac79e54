//! Coarse-grained classification for routing and logging errors.
//!
//! - Warning: the client sent something we rejected (4xx)
//! - Error: we failed to serve the request (5xx)
//! - Fatal: a panic was caught and converted
use crate::kind;
use crate::structured::StructuredError;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl StructuredError {
    pub fn severity(&self) -> Severity {
        if self.is_kind(kind::PANIC) {
            Severity::Fatal
        } else if self.code() >= 500 {
            Severity::Error
        } else {
            Severity::Warning
        }
    }
}
