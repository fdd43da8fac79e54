//! Walking `source()` chains.
//!
//! `StructuredError::matches` only looks at one error. These helpers apply it to
//! every link of a chain, so a handler can ask "is there a NOT_FOUND anywhere
//! under this?" without knowing how deep it was wrapped.

use std::error::Error as StdError;

use crate::any::{AnyError, OpaqueError};
use crate::structured::StructuredError;

/// The error itself followed by each successive `source()`.
pub fn causes<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// See through our own handle types to the error they carry.
fn unhandle<'a>(link: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    if let Some(any) = link.downcast_ref::<AnyError>() {
        return any.as_dyn();
    }
    if let Some(opaque) = link.downcast_ref::<OpaqueError>() {
        return opaque.get_ref();
    }
    link
}

/// The first structured error in the chain.
pub fn find_structured<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a StructuredError> {
    causes(err).find_map(|link| unhandle(link).downcast_ref::<StructuredError>())
}

/// True if any link matches `target`.
///
/// Structured links use [`StructuredError::matches`]. An opaque target also
/// matches a link that is the identical error.
pub fn is(err: &(dyn StdError + 'static), target: &AnyError) -> bool {
    causes(err).any(|link| {
        let link = unhandle(link);
        if let Some(structured) = link.downcast_ref::<StructuredError>() {
            if structured.matches(target) {
                return true;
            }
        }
        match target {
            AnyError::Opaque(opaque) => opaque.is_same(link),
            AnyError::Structured(_) => false,
        }
    })
}

/// The first link whose kind is `kind`.
pub fn find_kind<'a>(err: &'a (dyn StdError + 'static), kind: &str) -> Option<&'a StructuredError> {
    causes(err)
        .filter_map(|link| unhandle(link).downcast_ref::<StructuredError>())
        .find(|s| s.is_kind(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::kind;
    use crate::structured::{new, wrap};

    #[test]
    fn finds_kind_below_wrapping() {
        let err = wrap(wrap(catalog::not_found()));
        let target: AnyError = catalog::not_found().into();
        assert!(is(&err, &target));
        assert_eq!(
            find_kind(&err, kind::NOT_FOUND).map(|s| s.code()),
            Some(404)
        );
    }

    #[test]
    fn outermost_structured_is_found_first() {
        let err = wrap(new(409, "Conflict", kind::CONFLICT));
        let found = find_structured(&err).expect("structured");
        assert_eq!(found.kind(), kind::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn identical_opaque_cause_is_found() {
        let root = OpaqueError::msg("connection reset");
        let err = wrap(wrap(root.clone()));
        assert!(is(&err, &root.clone().into()));
        assert!(!is(&err, &OpaqueError::msg("connection reset").into()));
    }

    #[test]
    fn unrelated_kind_is_not_found() {
        let err = wrap(catalog::forbidden());
        assert!(!is(&err, &catalog::conflict().into()));
        assert_eq!(causes(&err).count(), 2);
    }

    #[test]
    fn causes_walks_foreign_sources_to_the_root() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err = wrap(wrap(AnyError::from_error(io)));
        let links: Vec<String> = causes(&err).map(|e| e.to_string()).collect();
        assert_eq!(links.len(), 3);
        assert_eq!(links.last().map(String::as_str), Some("missing.toml"));
    }

    #[test]
    fn handles_are_seen_through() {
        let any: AnyError = catalog::bad_request().into();
        assert_eq!(
            find_structured(&any).map(|s| s.kind()),
            Some(kind::BAD_REQUEST)
        );
    }
}
