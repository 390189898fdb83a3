//! Script-level error types.
//!
//! These are the errors a native function body raises back into the
//! running program. Interrupts (cancellation, deadlines) are deliberately
//! not representable here; see the interpreter crate.

use thiserror::Error;

/// The kind of JavaScript error.
///
/// These correspond to JavaScript's built-in error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic `Error`
    Error,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Reference to an undefined variable
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Internal engine error
    InternalError,
}

impl ErrorKind {
    /// Constructor name as seen by scripts.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

/// A JavaScript exception value raised by native code.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::type_error("undefined is not a function");
/// assert_eq!(error.kind, ErrorKind::TypeError);
/// assert_eq!(error.to_string(), "TypeError: undefined is not a function");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}: {message}", kind.name())]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl JsError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        JsError {
            kind,
            message: message.into(),
        }
    }

    /// Creates a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Creates a `RangeError`.
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    /// Creates a plain `Error`, used for errors surfaced from host code.
    pub fn host_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }
}

/// Failure to convert a language value into a host-native shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The value's shape cannot be represented as the requested host type.
    #[error("cannot export {from} as {to}")]
    Incompatible {
        /// `typeof`-style name of the source value
        from: &'static str,
        /// Requested host type
        to: &'static str,
    },
    /// The object graph refers back to itself.
    #[error("cannot export a circular structure")]
    Circular,
    /// Objects are nested deeper than the exporter follows.
    #[error("cannot export a structure nested deeper than {max_depth}")]
    TooDeep {
        /// The nesting limit
        max_depth: usize,
    },
}
