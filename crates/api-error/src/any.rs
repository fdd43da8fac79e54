use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::StructuredError;

/// Any error this crate can wrap or match against.
///
/// Structured errors compare by kind. Everything else is an [`OpaqueError`] and
/// compares by identity of the shared allocation.
#[derive(Clone, Debug, thiserror::Error)]
pub enum AnyError {
    #[error(transparent)]
    Structured(Arc<StructuredError>),
    #[error(transparent)]
    Opaque(OpaqueError),
}

impl AnyError {
    /// Convert an arbitrary error, recognising values that are already ours.
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(err))
    }

    pub fn from_boxed(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        let err = match err.downcast::<StructuredError>() {
            Ok(structured) => return AnyError::Structured(Arc::from(structured)),
            Err(other) => other,
        };
        let err = match err.downcast::<OpaqueError>() {
            Ok(opaque) => return AnyError::Opaque(*opaque),
            Err(other) => other,
        };
        match err.downcast::<AnyError>() {
            Ok(any) => *any,
            Err(other) => AnyError::Opaque(OpaqueError(Arc::from(other))),
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredError> {
        match self {
            AnyError::Structured(s) => Some(&**s),
            AnyError::Opaque(_) => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&OpaqueError> {
        match self {
            AnyError::Structured(_) => None,
            AnyError::Opaque(o) => Some(o),
        }
    }

    /// The error as a trait object, unwrapped from its handle.
    pub fn as_dyn(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match self {
            AnyError::Structured(s) => &**s,
            AnyError::Opaque(o) => o.get_ref(),
        }
    }
}

impl From<StructuredError> for AnyError {
    fn from(err: StructuredError) -> Self {
        AnyError::Structured(Arc::new(err))
    }
}

impl From<Arc<StructuredError>> for AnyError {
    fn from(err: Arc<StructuredError>) -> Self {
        AnyError::Structured(err)
    }
}

impl From<OpaqueError> for AnyError {
    fn from(err: OpaqueError) -> Self {
        AnyError::Opaque(err)
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for AnyError {
    fn from(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        AnyError::from_boxed(err)
    }
}

/// A shared handle to a foreign error.
///
/// Clones point at the same allocation, and two handles are equal only when they
/// do. Two independently created errors with identical text are not equal.
#[derive(Clone)]
pub struct OpaqueError(Arc<dyn StdError + Send + Sync + 'static>);

impl OpaqueError {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Convenience for ad hoc string errors.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        let boxed: Box<dyn StdError + Send + Sync> = message.into();
        Self(Arc::from(boxed))
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    pub fn ptr_eq(&self, other: &OpaqueError) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// True when `err` is the very error this handle points at.
    pub fn is_same(&self, err: &(dyn StdError + 'static)) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), err as *const dyn StdError)
    }
}

impl PartialEq for OpaqueError {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for OpaqueError {}

impl fmt::Debug for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl StdError for OpaqueError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}
