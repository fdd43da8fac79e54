use std::error::Error as StdError;

use crate::Result;
use crate::any::AnyError;
use crate::catalog::Preset;
use crate::policy::ErrorPolicy;
use crate::severity::Severity;
use crate::structured::{self, StructuredError};
use crate::violation::ValidationIssue;

/// Extension trait for `Result` enabling policy-driven emission without
/// contaminating core control-flow with side-effects.
///
/// Example
/// ```rust,ignore
/// use api_error::{catalog, Result, ResultExt, ErrorPolicy};
///
/// fn load(policy: &impl ErrorPolicy) -> Result<()> {
///     let r: Result<()> = Err(catalog::not_found());
///     r.emit_warning(policy) // emitted, still Err for the caller
/// }
/// ```
pub trait ResultExt<T> {
    /// Emit the error using the provided policy and return the result unchanged
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self;

    /// Emit only if the policy classifies the error as a warning
    fn emit_warning(self, policy: &impl ErrorPolicy) -> Self;

    /// Emit only if the policy classifies the error as an error
    fn emit_error(self, policy: &impl ErrorPolicy) -> Self;

    /// Emit only if the policy classifies the error as fatal
    fn emit_fatal(self, policy: &impl ErrorPolicy) -> Self;
}

impl<T> ResultExt<T> for Result<T> {
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self {
        if let Err(ref e) = self {
            policy.emit(e);
        }
        self
    }

    fn emit_warning(self, policy: &impl ErrorPolicy) -> Self {
        emit_if(self, policy, Severity::Warning)
    }

    fn emit_error(self, policy: &impl ErrorPolicy) -> Self {
        emit_if(self, policy, Severity::Error)
    }

    fn emit_fatal(self, policy: &impl ErrorPolicy) -> Self {
        emit_if(self, policy, Severity::Fatal)
    }
}

fn emit_if<T>(result: Result<T>, policy: &impl ErrorPolicy, severity: Severity) -> Result<T> {
    if let Err(ref e) = result {
        if policy.classify(e) == severity {
            policy.emit(e);
        }
    }
    result
}

/// Lift a foreign `Result` into a structured one.
pub trait WrapErr<T> {
    /// Wrap the error as an internal server error, keeping it as the cause.
    fn wrap_err(self) -> Result<T>;

    /// Wrap the error under a catalog class instead of the internal one.
    fn wrap_as(self, preset: Preset) -> Result<T>;
}

impl<T, E> WrapErr<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn wrap_err(self) -> Result<T> {
        self.map_err(|e| structured::wrap(AnyError::from_error(e)))
    }

    fn wrap_as(self, preset: Preset) -> Result<T> {
        self.map_err(|e| {
            StructuredError::builder(preset.code(), preset.message(), preset.kind())
                .cause(AnyError::from_error(e))
                .build()
        })
    }
}

/// Gather per-field validation results into one 422.
///
/// Example
/// ```rust,ignore
/// use api_error::{CollectViolations, ValidationIssue};
///
/// let checked = vec![Ok(1), Err(ValidationIssue::required("name", "Name is required"))];
/// let err = checked.collect_valid().unwrap_err();
/// assert_eq!(err.violations().len(), 1);
/// ```
pub trait CollectViolations<T>: Sized {
    /// All values if every item passed, otherwise every issue in input order.
    fn collect_valid(self) -> Result<Vec<T>>;
}

impl<I, T> CollectViolations<T> for I
where
    I: IntoIterator<Item = std::result::Result<T, ValidationIssue>>,
{
    fn collect_valid(self) -> Result<Vec<T>> {
        let mut values = Vec::new();
        let mut issues = Vec::new();
        for item in self {
            match item {
                Ok(v) => values.push(v),
                Err(issue) => issues.push(issue),
            }
        }
        if issues.is_empty() {
            Ok(values)
        } else {
            Err(structured::violations(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::catalog;
    use crate::kind::{self, ViolationKind};

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl ErrorPolicy for Counting {
        fn classify(&self, error: &StructuredError) -> Severity {
            error.severity()
        }

        fn emit(&self, _error: &StructuredError) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn emission_respects_classification() {
        let policy = Counting::default();
        let not_found: Result<()> = Err(catalog::not_found());

        let r = not_found.emit_error(&policy).emit_fatal(&policy);
        assert_eq!(policy.0.load(Ordering::SeqCst), 0);

        let r = r.emit_warning(&policy).emit_event(&policy);
        assert_eq!(policy.0.load(Ordering::SeqCst), 2);
        assert!(r.is_err());
    }

    #[test]
    fn ok_is_never_emitted() {
        let policy = Counting::default();
        let ok: Result<u8> = Ok(7);
        assert_eq!(ok.emit_event(&policy).expect("ok"), 7);
        assert_eq!(policy.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wrap_err_keeps_cause_text() {
        let r: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("db down"));
        let err = r.wrap_err().unwrap_err();
        assert_eq!(err.kind(), kind::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "db down");
        assert!(err.source().is_some());
    }

    #[test]
    fn wrap_as_uses_preset_class() {
        let r: std::result::Result<(), std::num::ParseIntError> = "x".parse::<i32>().map(|_| ());
        let err = r.wrap_as(Preset::BadRequest).unwrap_err();
        assert_eq!(err.code(), 400);
        assert_eq!(err.message(), "Bad request");
        assert!(err.cause().is_some());
    }

    #[test]
    fn collect_valid_gathers_every_issue() {
        let checked = vec![
            Ok("alice"),
            Err(ValidationIssue::required("email", "Email is required")),
            Ok("bob"),
            Err(ValidationIssue::new(ViolationKind::Min, "age", "Must be at least 18")),
        ];
        let err = checked.collect_valid().unwrap_err();
        assert_eq!(err.code(), 422);
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["email", "age"]);
    }

    #[test]
    fn collect_valid_passes_values_through() {
        let checked: Vec<std::result::Result<u32, ValidationIssue>> = vec![Ok(1), Ok(2)];
        assert_eq!(checked.collect_valid().expect("valid"), vec![1, 2]);
    }
}
