//! Error types for on-the-fly decoding.

use core::fmt;

use sbe_ir::{PrimitiveType, PrimitiveValue};

/// A buffer/IR pairing that cannot be decoded.
///
/// These are precondition violations: the buffer is shorter than its tokens
/// require, or the token list does not have the shape the decoder walks.
#[derive(Debug, Clone, PartialEq)]
pub enum OtfError {
    /// A read or write outside the buffer.
    OutOfBounds {
        /// First byte accessed
        index: usize,
        /// Number of bytes accessed
        width: usize,
        /// Buffer length
        len: usize,
    },
    /// A token that must sit at a fixed position has a negative offset.
    NegativeOffset {
        /// Token name
        name: String,
        /// The offset found
        offset: i32,
    },
    /// A token that must have a fixed size is variable length.
    VariableLength {
        /// Token name
        name: String,
    },
    /// A group or var data construct whose tokens are not laid out as expected.
    UnexpectedLayout {
        /// Name of the construct
        name: String,
        /// What was expected
        expected: &'static str,
    },
    /// An encoding that must be read has no primitive type.
    MissingPrimitiveType {
        /// Token name
        name: String,
    },
    /// A count or length read from a non-integer encoding.
    NotAnInteger {
        /// Token name
        name: String,
    },
    /// A value that cannot be written as the requested primitive type.
    UnwritableValue {
        /// Target type
        primitive_type: PrimitiveType,
        /// The value
        value: PrimitiveValue,
    },
    /// An error raised while decoding inside a named scope.
    InScope {
        /// Dotted scope path at the point of failure
        path: String,
        /// The underlying error
        source: Box<OtfError>,
    },
}

impl fmt::Display for OtfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtfError::OutOfBounds { index, width, len } => write!(
                f,
                "access of {width} bytes at index {index} is outside a buffer of {len} bytes"
            ),
            OtfError::NegativeOffset { name, offset } => {
                write!(f, "token '{name}' has no fixed position (offset {offset})")
            }
            OtfError::VariableLength { name } => {
                write!(f, "token '{name}' has no fixed length")
            }
            OtfError::UnexpectedLayout { name, expected } => {
                write!(f, "'{name}' is not laid out as {expected}")
            }
            OtfError::MissingPrimitiveType { name } => {
                write!(f, "encoding '{name}' has no primitive type")
            }
            OtfError::NotAnInteger { name } => {
                write!(f, "encoding '{name}' does not hold an integer")
            }
            OtfError::UnwritableValue {
                primitive_type,
                value,
            } => write!(f, "cannot write {value:?} as {primitive_type}"),
            OtfError::InScope { path, source } => write!(f, "{path}: {source}"),
        }
    }
}

impl core::error::Error for OtfError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            OtfError::InScope { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Var data text that cannot be decoded with its character encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDecodeError {
    /// The character encoding is not one the decoder knows.
    Unsupported {
        /// Field name
        field: String,
        /// Declared character encoding
        character_encoding: String,
    },
    /// The bytes are not valid in the character encoding.
    Invalid {
        /// Field name
        field: String,
        /// Declared character encoding
        character_encoding: String,
        /// Offset of the first invalid byte
        position: usize,
    },
}

impl fmt::Display for TextDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextDecodeError::Unsupported {
                field,
                character_encoding,
            } => write!(
                f,
                "unsupported character encoding '{character_encoding}' for '{field}'"
            ),
            TextDecodeError::Invalid {
                field,
                character_encoding,
                position,
            } => write!(
                f,
                "invalid {character_encoding} text in '{field}' at byte {position}"
            ),
        }
    }
}

impl core::error::Error for TextDecodeError {}
