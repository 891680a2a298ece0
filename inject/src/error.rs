//! Error types for the `inject` container.
//!
//! A single error model is used by every registration and resolution path.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category and a human-readable message.
//!
//! Errors raised while resolving a nested argument are handed back to the
//! outermost caller unchanged: a missing `C` three levels down surfaces as
//! `UnregisteredType` naming `C`, not as a failure of the type that was asked
//! for.
//!
//! # Feature Flags
//!
//! - `tracing`: logs errors when they are created.
//!
//! # Examples
//!
//! ```
//! use inject::error::{Error, ErrorKind};
//!
//! let err = Error::unregistered_type("MyService");
//! assert_eq!(err.kind, ErrorKind::UnregisteredType);
//! assert!(err.message.contains("MyService"));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::error;

/// Error categories for the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A factory is already registered for the type.
    DuplicateRegistration,
    /// No factory is registered for the requested type.
    UnregisteredType,
    /// The requested type is already being resolved further up the same chain.
    CyclicDependency,
    /// The entry stored under a key does not hold a factory for the key's type.
    TypeMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::DuplicateRegistration => "duplicate registration",
            ErrorKind::UnregisteredType => "unregistered type",
            ErrorKind::CyclicDependency => "cyclic dependency",
            ErrorKind::TypeMismatch => "type mismatch",
        };
        f.write_str(name)
    }
}

/// Container error structure.
///
/// `kind` enables programmatic handling, while `message` is human-readable.
#[derive(Debug, Clone, thiserror::Error)]
#[error("({kind}) {message}")]
pub struct Error {
    /// Category of the failure.
    pub kind: ErrorKind,
    /// Human-readable description, naming the type involved.
    pub message: String,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// If the `tracing` feature is enabled, the error is logged on creation.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
        };

        #[cfg(feature = "tracing")]
        error!("{}", error);

        error
    }

    /// A factory for `type_name` was registered twice.
    pub fn duplicate_registration(type_name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateRegistration,
            format!("A factory is already registered for type: {type_name}"),
        )
    }

    /// Nothing is registered for `type_name`.
    pub fn unregistered_type(type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnregisteredType,
            format!("No factory registered for type: {type_name}"),
        )
    }

    /// Resolution re-entered a type that is still being resolved.
    ///
    /// `chain` lists the types from the outermost resolve to the repeated one.
    pub fn cyclic_dependency(chain: &[&str]) -> Self {
        Self::new(
            ErrorKind::CyclicDependency,
            format!("Cyclic dependency detected: {}", chain.join(" -> ")),
        )
    }

    /// The entry stored for `type_name` could not be downcast to it.
    pub fn type_mismatch(type_name: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Stored factory does not produce type: {type_name}"),
        )
    }
}
