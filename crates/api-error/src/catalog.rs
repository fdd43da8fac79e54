//! Ready-made errors for common API conditions.
//!
//! Every factory builds a fresh value, so the captured stack points at the
//! caller. Nothing here is a shared instance and nothing is mutated after
//! construction. [`Preset`] exposes the fixed kind/code/message table without
//! capturing anything.
//!
//! | kind | code | message |
//! |---|---|---|
//! | BAD_REQUEST | 400 | Bad request |
//! | UNAUTHORIZED | 401 | Unauthorized |
//! | FORBIDDEN | 403 | Forbidden |
//! | NOT_FOUND | 404 | Not found |
//! | CONFLICT | 409 | Conflict |
//! | UNPROCESSABLE_ENTITY | 422 | Unprocessable entity |
//! | INTERNAL_SERVER_ERROR | 500 | Internal server error |
//! | PANIC | 500 | Panic |

use std::fmt;
use std::str::FromStr;

use crate::kind::{self, ParseKindError};
use crate::structured::StructuredError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    InternalServerError,
    Panic,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::BadRequest,
        Preset::Unauthorized,
        Preset::Forbidden,
        Preset::NotFound,
        Preset::Conflict,
        Preset::UnprocessableEntity,
        Preset::InternalServerError,
        Preset::Panic,
    ];

    pub const fn kind(self) -> &'static str {
        match self {
            Preset::BadRequest => kind::BAD_REQUEST,
            Preset::Unauthorized => kind::UNAUTHORIZED,
            Preset::Forbidden => kind::FORBIDDEN,
            Preset::NotFound => kind::NOT_FOUND,
            Preset::Conflict => kind::CONFLICT,
            Preset::UnprocessableEntity => kind::UNPROCESSABLE_ENTITY,
            Preset::InternalServerError => kind::INTERNAL_SERVER_ERROR,
            Preset::Panic => kind::PANIC,
        }
    }

    pub const fn code(self) -> u16 {
        match self {
            Preset::BadRequest => 400,
            Preset::Unauthorized => 401,
            Preset::Forbidden => 403,
            Preset::NotFound => 404,
            Preset::Conflict => 409,
            Preset::UnprocessableEntity => 422,
            Preset::InternalServerError | Preset::Panic => 500,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Preset::BadRequest => "Bad request",
            Preset::Unauthorized => "Unauthorized",
            Preset::Forbidden => "Forbidden",
            Preset::NotFound => "Not found",
            Preset::Conflict => "Conflict",
            Preset::UnprocessableEntity => "Unprocessable entity",
            Preset::InternalServerError => "Internal server error",
            Preset::Panic => "Panic",
        }
    }

    /// Look up the preset whose kind tag is `kind`.
    pub fn from_kind(kind: &str) -> Option<Preset> {
        Preset::ALL.into_iter().find(|p| p.kind() == kind)
    }

    /// Build a fresh error for this preset.
    pub fn build(self) -> StructuredError {
        StructuredError::builder(self.code(), self.message(), self.kind()).build()
    }

    /// True if `err` belongs to this preset's class.
    pub fn matches(self, err: &StructuredError) -> bool {
        err.is_kind(self.kind())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.kind())
    }
}

impl FromStr for Preset {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::from_kind(s).ok_or_else(|| ParseKindError::UnknownPreset(s.to_string()))
    }
}

impl From<Preset> for StructuredError {
    fn from(preset: Preset) -> Self {
        preset.build()
    }
}

pub fn bad_request() -> StructuredError {
    Preset::BadRequest.build()
}

pub fn unauthorized() -> StructuredError {
    Preset::Unauthorized.build()
}

pub fn forbidden() -> StructuredError {
    Preset::Forbidden.build()
}

pub fn not_found() -> StructuredError {
    Preset::NotFound.build()
}

pub fn conflict() -> StructuredError {
    Preset::Conflict.build()
}

pub fn unprocessable_entity() -> StructuredError {
    Preset::UnprocessableEntity.build()
}

pub fn internal_server_error() -> StructuredError {
    Preset::InternalServerError.build()
}

/// For errors recovered from a caught panic.
pub fn panic() -> StructuredError {
    Preset::Panic.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_fixed_fields() {
        let err = not_found();
        assert_eq!(err.code(), 404);
        assert_eq!(err.kind(), "NOT_FOUND");
        assert_eq!(err.message(), "Not found");
        assert!(err.violations().is_empty());
        assert!(err.cause().is_none());
    }

    #[test]
    fn factories_agree_with_table() {
        let built = [
            bad_request(),
            unauthorized(),
            forbidden(),
            not_found(),
            conflict(),
            unprocessable_entity(),
            internal_server_error(),
            panic(),
        ];
        for (preset, err) in Preset::ALL.into_iter().zip(built.iter()) {
            assert_eq!(err.code(), preset.code(), "{preset}");
            assert_eq!(err.kind(), preset.kind(), "{preset}");
            assert_eq!(err.message(), preset.message(), "{preset}");
            assert!(preset.matches(err));
        }
    }

    #[test]
    fn kinds_are_unique() {
        for a in Preset::ALL {
            for b in Preset::ALL {
                assert_eq!(a == b, a.kind() == b.kind());
            }
        }
    }

    #[test]
    fn panic_shares_code_but_not_kind_with_internal() {
        let p = panic();
        let i = internal_server_error();
        assert_eq!(p.code(), i.code());
        assert!(!p.same_kind(&i));
    }

    #[test]
    fn each_call_is_a_fresh_value() {
        let a = unauthorized();
        let b = unauthorized();
        assert!(a.same_kind(&b));
        assert_eq!(a.code(), 401);
        assert_eq!(b.code(), 401);
    }

    #[test]
    fn preset_from_kind() {
        assert_eq!("CONFLICT".parse::<Preset>(), Ok(Preset::Conflict));
        assert_eq!(Preset::from_kind("TEAPOT"), None);
        assert_eq!(
            "TEAPOT".parse::<Preset>(),
            Err(ParseKindError::UnknownPreset("TEAPOT".into()))
        );
    }
}
