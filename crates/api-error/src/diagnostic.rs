//! `miette` integration, behind the `diagnostic` feature.

#![cfg(feature = "diagnostic")]

use std::fmt;

use crate::any::AnyError;
use crate::severity::Severity;
use crate::structured::StructuredError;
use crate::violation::ValidationIssue;

struct IssueList<'a>(&'a [ValidationIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl miette::Diagnostic for StructuredError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match StructuredError::severity(self) {
            Severity::Warning => miette::Severity::Warning,
            Severity::Error | Severity::Fatal => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.violations().is_empty() {
            None
        } else {
            Some(Box::new(IssueList(self.violations())))
        }
    }

    fn diagnostic_source(&self) -> Option<&dyn miette::Diagnostic> {
        match self.cause() {
            Some(AnyError::Structured(inner)) => Some(&**inner),
            _ => None,
        }
    }
}
