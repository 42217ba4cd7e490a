//! Error types for Ziggy decoding and encoding.
//!
//! ## Error Categories
//!
//! - **Parse errors**: the document contains unparseable regions. The error carries one
//!   positioned [`Diagnostic`] per region and a rendered, user-presentable message.
//! - **Unsupported nodes**: the interpreter met a syntax node it has no rule for.
//! - **Callback errors**: a registered struct constructor, tagged-literal converter or
//!   serialization function failed. The original error is kept as-is.
//! - **Serialization errors**: a value has no Ziggy representation and no registered
//!   serialization function.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ziggy::{parse, Error};
//!
//! let err = parse("[1, 2").unwrap_err();
//! assert!(matches!(err, Error::Parse { .. }));
//! assert!(err.to_string().starts_with("Parse error:"));
//! ```

use crate::diagnostics::Diagnostic;
use std::fmt;
use thiserror::Error;

/// The error type returned by user-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Represents all possible errors that can occur while decoding or encoding Ziggy.
#[derive(Debug, Error)]
pub enum Error {
    /// The document contains one or more unparseable regions.
    #[error("{message}")]
    Parse {
        /// Rendered diagnostics, ready to show to an end user.
        message: String,
        /// One entry per error region, in document order.
        diagnostics: Vec<Diagnostic>,
    },

    /// A syntax node type with no interpretation rule.
    #[error("unsupported node: {0}")]
    UnsupportedNode(String),

    /// A numeric lexeme that the literal decoder could not interpret.
    #[error("invalid {kind} literal: {lexeme:?}")]
    InvalidNumber {
        kind: &'static str,
        lexeme: String,
    },

    /// A registered constructor, converter or serialization function failed.
    #[error(transparent)]
    Callback(BoxError),

    /// A value without a Ziggy representation.
    #[error("cannot serialize {0}")]
    Serialization(String),

    /// Nesting went past the configured limit.
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a parse error from the diagnostics collected over a syntax tree.
    pub fn parse(message: String, diagnostics: Vec<Diagnostic>) -> Self {
        Error::Parse {
            message,
            diagnostics,
        }
    }

    /// Creates an error for a value that has no Ziggy representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ziggy::Error;
    ///
    /// let err = Error::serialization("enum variant `Shape::Circle`");
    /// assert_eq!(err.to_string(), "cannot serialize enum variant `Shape::Circle`");
    /// ```
    pub fn serialization<T: fmt::Display>(what: T) -> Self {
        Error::Serialization(what.to_string())
    }

    pub fn invalid_number(kind: &'static str, lexeme: &str) -> Self {
        Error::InvalidNumber {
            kind,
            lexeme: lexeme.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the positioned diagnostics of a parse error, or an empty slice.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Parse { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
