use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use crate::any::AnyError;
use crate::capture::{self, FrameCapture};
use crate::kind;
use crate::violation::ValidationIssue;

/// Message used by [`wrap`] and [`default_error`].
pub const INTERNAL_MESSAGE: &str = "An internal server error occurred";

/// Message used by [`violations`].
pub const UNPROCESSABLE_MESSAGE: &str = "Unprocessable entity";

/// A classifiable error for API boundaries.
///
/// Carries a stable `kind` tag used for matching, an HTTP-style `code`, a human
/// `message`, optional field-level [`ValidationIssue`]s, an optional wrapped
/// cause and the call stack captured when it was built.
///
/// Values are immutable once built. `Display` shows the cause when there is
/// one and the message otherwise; [`StdError::source`] returns the cause.
///
/// Equality is deliberately weak, see [`StructuredError::matches`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "ResponseBody"))]
#[derive(Clone, Debug)]
pub struct StructuredError {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    kind: Cow<'static, str>,
    code: u16,
    message: Cow<'static, str>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    violations: Vec<ValidationIssue>,
    #[cfg_attr(feature = "serde", serde(skip))]
    cause: Option<AnyError>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "stack_traces", skip_serializing_if = "Vec::is_empty")
    )]
    stack_trace: Vec<String>,
}

/// Wire shape read back by clients; goes through the same kind rules as
/// [`StructuredErrorBuilder::build`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ResponseBody {
    #[serde(rename = "type")]
    kind: String,
    code: u16,
    message: String,
    #[serde(default)]
    violations: Vec<ValidationIssue>,
    #[serde(rename = "stack_traces", default)]
    stack_trace: Vec<String>,
}

#[cfg(feature = "serde")]
impl From<ResponseBody> for StructuredError {
    fn from(body: ResponseBody) -> Self {
        StructuredError {
            kind: kind_or_unknown(body.kind.into(), body.code, &body.message),
            code: body.code,
            message: body.message.into(),
            violations: body.violations,
            cause: None,
            stack_trace: body.stack_trace,
        }
    }
}

/// Empty kinds become [`kind::UNKNOWN`] so every error stays matchable.
fn kind_or_unknown(kind: Cow<'static, str>, code: u16, message: &str) -> Cow<'static, str> {
    if !kind.is_empty() {
        return kind;
    }
    #[cfg(feature = "tracing")]
    tracing::warn!(
        code,
        error_message = %message,
        "structured error built without a kind"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (code, message);
    Cow::Borrowed(kind::UNKNOWN)
}

/// Build a fresh error with no violations and no cause.
pub fn new(
    code: u16,
    message: impl Into<Cow<'static, str>>,
    kind: impl Into<Cow<'static, str>>,
) -> StructuredError {
    StructuredError::builder(code, message, kind).build()
}

/// Wrap an underlying error in a generic internal error.
///
/// The result displays as the cause does; its own kind, code and message
/// describe the wrapping context.
pub fn wrap(cause: impl Into<AnyError>) -> StructuredError {
    StructuredError::builder(500, INTERNAL_MESSAGE, kind::INTERNAL_SERVER_ERROR)
        .cause(cause)
        .build()
}

/// A 422 carrying field-level violations, in the order given.
pub fn violations<I>(issues: I) -> StructuredError
where
    I: IntoIterator<Item = ValidationIssue>,
{
    StructuredError::builder(422, UNPROCESSABLE_MESSAGE, kind::UNPROCESSABLE_ENTITY)
        .violations(issues)
        .build()
}

/// Same class as [`wrap`], without a cause.
pub fn default_error() -> StructuredError {
    StructuredError::builder(500, INTERNAL_MESSAGE, kind::INTERNAL_SERVER_ERROR).build()
}

impl StructuredError {
    pub fn builder(
        code: u16,
        message: impl Into<Cow<'static, str>>,
        kind: impl Into<Cow<'static, str>>,
    ) -> StructuredErrorBuilder<'static> {
        StructuredErrorBuilder {
            kind: kind.into(),
            code,
            message: message.into(),
            violations: Vec::new(),
            cause: None,
            capture: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violations(&self) -> &[ValidationIssue] {
        &self.violations
    }

    pub fn cause(&self) -> Option<&AnyError> {
        self.cause.as_ref()
    }

    pub fn stack_trace(&self) -> &[String] {
        &self.stack_trace
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        *self.kind == *kind
    }

    pub fn same_kind(&self, other: &StructuredError) -> bool {
        self.kind == other.kind
    }

    /// Classification match, not value equality.
    ///
    /// Against another structured error only the kinds are compared. Against a
    /// foreign error the answer is whether it is this error's cause, by identity.
    pub fn matches(&self, target: &AnyError) -> bool {
        match target {
            AnyError::Structured(other) => self.same_kind(other),
            AnyError::Opaque(other) => {
                matches!(&self.cause, Some(AnyError::Opaque(cause)) if cause.ptr_eq(other))
            }
        }
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => fmt::Display::fmt(cause, f),
            None => f.write_str(&self.message),
        }
    }
}

impl StdError for StructuredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause.as_dyn() as &(dyn StdError + 'static))
    }
}

/// Assembles a [`StructuredError`]; the stack is captured in [`Self::build`].
#[must_use]
pub struct StructuredErrorBuilder<'c> {
    kind: Cow<'static, str>,
    code: u16,
    message: Cow<'static, str>,
    violations: Vec<ValidationIssue>,
    cause: Option<AnyError>,
    capture: Option<&'c dyn FrameCapture>,
}

impl<'c> StructuredErrorBuilder<'c> {
    pub fn violations<I>(mut self, issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        self.violations = issues.into_iter().collect();
        self
    }

    pub fn cause(mut self, cause: impl Into<AnyError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Use `capture` instead of the process-wide service.
    pub fn capture_with<'n>(self, capture: &'n dyn FrameCapture) -> StructuredErrorBuilder<'n> {
        StructuredErrorBuilder {
            kind: self.kind,
            code: self.code,
            message: self.message,
            violations: self.violations,
            cause: self.cause,
            capture: Some(capture),
        }
    }

    pub fn build(self) -> StructuredError {
        let kind = kind_or_unknown(self.kind, self.code, &self.message);
        let stack_trace = match self.capture {
            Some(capture) => capture::capture_with(capture),
            None => capture::capture_with(capture::global()),
        };
        StructuredError {
            kind,
            code: self.code,
            message: self.message,
            violations: self.violations,
            cause: self.cause,
            stack_trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any::OpaqueError;
    use crate::capture::{FixedCapture, NoopCapture};
    use crate::kind::ViolationKind;

    #[test]
    fn new_displays_message() {
        let err = new(404, "Not found", kind::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.code(), 404);
        assert_eq!(err.kind(), kind::NOT_FOUND);
        assert!(err.violations().is_empty());
        assert!(err.cause().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn same_kind_matches_regardless_of_code_and_message() {
        let a = new(404, "Not found", kind::NOT_FOUND);
        let b = new(410, "Gone for good", kind::NOT_FOUND);
        assert!(a.matches(&b.clone().into()));
        assert!(b.matches(&a.into()));
    }

    #[test]
    fn different_kind_does_not_match() {
        let a = new(404, "Not found", kind::NOT_FOUND);
        let b = new(400, "Bad request", kind::BAD_REQUEST);
        assert!(!a.matches(&b.into()));
    }

    #[test]
    fn wrap_displays_and_unwraps_cause() {
        let cause = OpaqueError::msg("db down");
        let err = wrap(cause.clone());
        assert_eq!(err.to_string(), "db down");
        assert_eq!(err.kind(), kind::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), INTERNAL_MESSAGE);
        assert_eq!(err.cause().and_then(AnyError::as_opaque), Some(&cause));
        let source = err.source().expect("source");
        assert!(cause.is_same(source));
    }

    #[test]
    fn opaque_target_matches_only_the_identical_cause() {
        let cause = OpaqueError::msg("db down");
        let lookalike = OpaqueError::msg("db down");
        let err = wrap(cause.clone());
        assert!(err.matches(&cause.into()));
        assert!(!err.matches(&lookalike.clone().into()));
        assert!(!default_error().matches(&lookalike.into()));
    }

    #[test]
    fn wrapping_a_structured_error_keeps_the_chain() {
        let inner = new(404, "Not found", kind::NOT_FOUND);
        let outer = wrap(inner);
        assert_eq!(outer.to_string(), "Not found");
        assert_eq!(outer.kind(), kind::INTERNAL_SERVER_ERROR);
        let source = outer.source().expect("source");
        let inner = source
            .downcast_ref::<StructuredError>()
            .expect("structured cause");
        assert_eq!(inner.kind(), kind::NOT_FOUND);
    }

    #[test]
    fn violations_preserve_order() {
        let err = violations([
            ValidationIssue::required("email", "Email is required"),
            ValidationIssue::new(ViolationKind::Email, "email", "Invalid email format"),
        ]);
        assert_eq!(err.code(), 422);
        assert_eq!(err.kind(), kind::UNPROCESSABLE_ENTITY);
        assert_eq!(err.violations().len(), 2);
        assert_eq!(err.violations()[0].kind, ViolationKind::Required);
        assert_eq!(err.violations()[1].kind, ViolationKind::Email);
    }

    #[test]
    fn empty_violations_still_unprocessable() {
        let err = violations(Vec::new());
        assert!(err.violations().is_empty());
        assert_eq!(err.to_string(), UNPROCESSABLE_MESSAGE);
    }

    #[test]
    fn default_error_is_internal_without_cause() {
        let err = default_error();
        assert_eq!(err.code(), 500);
        assert_eq!(err.kind(), kind::INTERNAL_SERVER_ERROR);
        assert!(err.cause().is_none());
        assert_eq!(err.to_string(), INTERNAL_MESSAGE);
    }

    #[test]
    fn empty_kind_is_replaced() {
        let err = new(418, "teapot", "");
        assert_eq!(err.kind(), kind::UNKNOWN);
    }

    #[test]
    fn builder_uses_injected_capture() {
        let capture = FixedCapture::new(["handlers.rs:10 orders::fetch"]);
        let err = StructuredError::builder(409, "Conflict", kind::CONFLICT)
            .capture_with(&capture)
            .build();
        assert_eq!(err.stack_trace(), ["handlers.rs:10 orders::fetch".to_string()]);

        let quiet = StructuredError::builder(409, "Conflict", kind::CONFLICT)
            .capture_with(&NoopCapture)
            .build();
        assert!(quiet.stack_trace().is_empty());
    }

    #[test]
    fn stack_trace_is_not_part_of_matching() {
        let a = StructuredError::builder(403, "Forbidden", kind::FORBIDDEN)
            .capture_with(&FixedCapture::new(["a.rs:1 a"]))
            .build();
        let b = StructuredError::builder(403, "Forbidden", kind::FORBIDDEN)
            .capture_with(&NoopCapture)
            .build();
        assert!(a.same_kind(&b));
    }
}
