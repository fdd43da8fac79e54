//! Kind tags.
//!
//! A kind is the stable, machine-readable class of an error. Matching between
//! two [`crate::StructuredError`] values compares kinds only, so these strings
//! are part of the public contract and must never change once published.

use std::fmt;
use std::str::FromStr;

pub const BAD_REQUEST: &str = "BAD_REQUEST";
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
pub const FORBIDDEN: &str = "FORBIDDEN";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const CONFLICT: &str = "CONFLICT";
pub const UNPROCESSABLE_ENTITY: &str = "UNPROCESSABLE_ENTITY";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
pub const PANIC: &str = "PANIC";

/// Substituted when a caller constructs an error with an empty kind.
pub const UNKNOWN: &str = "UNKNOWN";

/// Reason a single input field failed validation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    #[cfg_attr(feature = "serde", serde(rename = "REQUIRED"))]
    Required,
    #[cfg_attr(feature = "serde", serde(rename = "EMAIL"))]
    Email,
    #[cfg_attr(feature = "serde", serde(rename = "MIN"))]
    Min,
    #[cfg_attr(feature = "serde", serde(rename = "MAX"))]
    Max,
    #[cfg_attr(feature = "serde", serde(rename = "UUID"))]
    Uuid,
    #[cfg_attr(feature = "serde", serde(rename = "DATE"))]
    Date,
    #[cfg_attr(feature = "serde", serde(rename = "ONEOF"))]
    OneOf,
    #[cfg_attr(feature = "serde", serde(rename = "REQUIRED_IF"))]
    RequiredIf,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 8] = [
        ViolationKind::Required,
        ViolationKind::Email,
        ViolationKind::Min,
        ViolationKind::Max,
        ViolationKind::Uuid,
        ViolationKind::Date,
        ViolationKind::OneOf,
        ViolationKind::RequiredIf,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ViolationKind::Required => "REQUIRED",
            ViolationKind::Email => "EMAIL",
            ViolationKind::Min => "MIN",
            ViolationKind::Max => "MAX",
            ViolationKind::Uuid => "UUID",
            ViolationKind::Date => "DATE",
            ViolationKind::OneOf => "ONEOF",
            ViolationKind::RequiredIf => "REQUIRED_IF",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseKindError {
    #[error("Unknown violation kind: {0}")]
    UnknownViolation(String),
    #[error("Unknown catalog kind: {0}")]
    UnknownPreset(String),
}

impl FromStr for ViolationKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViolationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseKindError::UnknownViolation(s.to_string()))
    }
}
