//! Error types for Brack parsing, printing and the object codec.
//!
//! This module provides one [`Error`] enum covering the whole crate, with
//! contextual information to help diagnose malformed input and codec
//! mismatches.
//!
//! ## Error Categories
//!
//! - **Format errors**: invalid Brack syntax with line/column information and
//!   a bounded snippet of the unconsumed input
//! - **Unsupported values**: values the printer has no literal for
//!   (non-finite floats), or composite values used where a scalar is required
//! - **Codec errors**: unknown type names, spurious map keys, shape
//!   mismatches and failed scalar conversions
//!
//! ## Examples
//!
//! ```rust
//! use brack::{parse, Error};
//!
//! let result = parse("{foo bar baz}");
//! assert!(result.is_err());
//!
//! if let Err(err) = result {
//!     eprintln!("Parse error: {}", err);
//!     // Format errors include line, column and a snippet of the input
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors produced by this crate.
///
/// Each variant includes contextual information to aid debugging.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed Brack text.
    #[error("Format error at line {line}, column {col}: {msg}\nNear: {snippet}")]
    Format {
        line: usize,
        col: usize,
        msg: String,
        snippet: String,
    },

    /// A value the printer or codec cannot represent.
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// A scalar conversion that cannot be performed.
    #[error("Cannot convert {found} to {target}")]
    Conversion { target: String, found: String },

    /// A map key with no matching member on the target type.
    #[error("Spurious key '{key}' for type {type_name}")]
    SpuriousKey { key: String, type_name: String },

    /// A type name that no registry entry or namespace resolves.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A value whose shape does not match the expected type.
    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    /// An enum token that matches no variant of the target enum.
    #[error("No variant of {type_name} matches '{token}'")]
    UnknownVariant { type_name: String, token: String },

    /// Custom error from a macro processor or codec hook.
    #[error("Error: {0}")]
    Custom(String),

    /// Generic message.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a format error with position information and an input snippet.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use brack::Error;
    ///
    /// let err = Error::format(10, 5, "unexpected token", "baz}");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn format(line: usize, col: usize, msg: impl Into<String>, snippet: impl Into<String>) -> Self {
        Error::Format {
            line,
            col,
            msg: msg.into(),
            snippet: snippet.into(),
        }
    }

    /// Creates an unsupported value error.
    pub fn unsupported_value(msg: impl Into<String>) -> Self {
        Error::UnsupportedValue(msg.into())
    }

    /// Creates a conversion error for a scalar that cannot take the value.
    pub fn conversion(target: impl Into<String>, found: impl Into<String>) -> Self {
        Error::Conversion {
            target: target.into(),
            found: found.into(),
        }
    }

    /// Creates a spurious key error for a map key with no matching member.
    pub fn spurious_key(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Error::SpuriousKey {
            key: key.into(),
            type_name: type_name.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Error::UnknownType(name.into())
    }

    /// Creates a shape mismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an unknown variant error.
    pub fn unknown_variant(type_name: impl Into<String>, token: impl Into<String>) -> Self {
        Error::UnknownVariant {
            type_name: type_name.into(),
            token: token.into(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use brack::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
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
