//! Policies for classifying and emitting errors.
//!
//! Construction never logs. Handlers at the API boundary install an
//! [`ErrorPolicy`] to decide how errors are surfaced before they are rendered
//! into a response: tracing logs, a diagnostic report, telemetry, or nothing.
//!
//! Example
//! ```rust,ignore
//! use api_error::{ErrorPolicy, Severity, StructuredError};
//!
//! struct PrintPolicy;
//! impl ErrorPolicy for PrintPolicy {
//!     fn classify(&self, e: &StructuredError) -> Severity { e.severity() }
//!     fn emit(&self, e: &StructuredError) { eprintln!("[{:?}] {} {e}", self.classify(e), e.kind()); }
//! }
//! ```
use crate::severity::Severity;
use crate::structured::StructuredError;

pub trait ErrorPolicy: Send + Sync {
    /// Classify the error's severity
    fn classify(&self, error: &StructuredError) -> Severity;

    /// Surface the error (log, report, forward)
    fn emit(&self, error: &StructuredError);
}

/// Classifies by the error's own severity and emits nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopPolicy;

impl ErrorPolicy for NoopPolicy {
    fn classify(&self, error: &StructuredError) -> Severity {
        error.severity()
    }

    fn emit(&self, _error: &StructuredError) {}
}

/// Emits through `tracing`: client errors at WARN, everything else at ERROR.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn classify(&self, error: &StructuredError) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &StructuredError) {
        let frames = error.stack_trace().len();
        match self.classify(error) {
            Severity::Warning => tracing::warn!(
                kind = error.kind(),
                code = error.code(),
                violations = error.violations().len(),
                error = %error,
                "request rejected"
            ),
            Severity::Error | Severity::Fatal => tracing::error!(
                kind = error.kind(),
                code = error.code(),
                frames,
                error = %error,
                origin = error.stack_trace().first().map(String::as_str),
                "request failed"
            ),
        }
    }
}

/// Prints a miette report to stderr.
#[cfg(feature = "diagnostic")]
#[derive(Debug, Clone, Default)]
pub struct MiettePolicy;

#[cfg(feature = "diagnostic")]
impl ErrorPolicy for MiettePolicy {
    fn classify(&self, error: &StructuredError) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &StructuredError) {
        let report = miette::Report::new(error.clone());
        eprintln!("{report:?}");
    }
}

/// Delegates to several policies.
///
/// - classify: the highest severity among inner policies, or the error's own
///   when there are none.
/// - emit: every inner policy, in insertion order.
#[derive(Default)]
pub struct CombinedPolicy {
    policies: Vec<Box<dyn ErrorPolicy>>,
}

impl CombinedPolicy {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            policies: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style add.
    pub fn push<P: ErrorPolicy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn add_boxed(mut self, policy: Box<dyn ErrorPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl ErrorPolicy for CombinedPolicy {
    fn classify(&self, error: &StructuredError) -> Severity {
        self.policies
            .iter()
            .map(|p| p.classify(error))
            .max_by_key(|s| severity_rank(*s))
            .unwrap_or_else(|| error.severity())
    }

    fn emit(&self, error: &StructuredError) {
        for p in &self.policies {
            p.emit(error);
        }
    }
}

fn severity_rank(s: Severity) -> u8 {
    match s {
        Severity::Warning => 0,
        Severity::Error => 1,
        Severity::Fatal => 2,
    }
}
