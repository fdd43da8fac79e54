//! Structured, classifiable errors for HTTP-style APIs.
//!
//! A [`StructuredError`] carries a stable kind tag, a numeric code, a human
//! message, optional field-level violations, an optional cause and the call
//! stack captured when it was built. Application code returns these instead of
//! ad hoc strings so every boundary can classify and render them the same way.
//!
//! ```rust,ignore
//! use api_error::{catalog, kind, wrap, AnyError, Result};
//!
//! fn load(id: u64) -> Result<String> {
//!     if id == 0 {
//!         return Err(catalog::not_found());
//!     }
//!     std::fs::read_to_string(format!("/data/{id}")).map_err(|e| wrap(AnyError::from_error(e)))
//! }
//!
//! let err = load(0).unwrap_err();
//! assert!(err.is_kind(kind::NOT_FOUND));
//! ```
//!
//! Features:
//! - `serde` (default): `Serialize`/`Deserialize` and [`PrettyDebug`].
//! - `tracing`: [`TracingPolicy`] and tracing hooks.
//! - `diagnostic`: `miette::Diagnostic` and `MiettePolicy`.

pub mod any;
pub mod capture;
pub mod catalog;
pub mod chain;
mod diagnostic;
pub mod kind;
pub mod policy;
pub mod pretty;
pub mod result_ext;
pub mod severity;
pub mod structured;
pub mod violation;

// public exports
pub use any::{AnyError, OpaqueError};
pub use capture::{BacktraceCapture, FixedCapture, FrameCapture, NoopCapture};
pub use catalog::Preset;
pub use kind::{ParseKindError, ViolationKind};
#[cfg(feature = "diagnostic")]
pub use policy::MiettePolicy;
#[cfg(feature = "tracing")]
pub use policy::TracingPolicy;
pub use policy::{CombinedPolicy, ErrorPolicy, NoopPolicy};
#[cfg(feature = "serde")]
pub use pretty::PrettyDebug;
pub use result_ext::{CollectViolations, ResultExt, WrapErr};
pub use severity::Severity;
pub use structured::{
    StructuredError, StructuredErrorBuilder, default_error, new, violations, wrap,
};
pub use violation::ValidationIssue;

pub type Result<T, E = StructuredError> = std::result::Result<T, E>;
