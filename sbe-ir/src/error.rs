//! Error types for IR construction and the serialized IR form.

use core::fmt;

use crate::{ParseValueError, Signal};

/// A malformed token stream, detected while building an [`Ir`](crate::Ir).
#[derive(Debug, Clone, PartialEq)]
pub enum IrError {
    /// The message token list is empty.
    EmptyMessage {
        /// Message id passed to `add_message`
        message_id: i64,
    },
    /// The list does not start with `BEGIN_MESSAGE` and end with `END_MESSAGE`.
    NotAMessage {
        /// Message id passed to `add_message`
        message_id: i64,
        /// Signal of the first token
        first: Signal,
        /// Signal of the last token
        last: Signal,
    },
    /// An `END_X` with no open `BEGIN_X`.
    UnmatchedEnd {
        /// The end signal
        signal: Signal,
        /// Name on the end token
        name: String,
        /// Index of the end token
        index: usize,
    },
    /// A `BEGIN_X` that is never closed.
    UnclosedBegin {
        /// The begin signal
        signal: Signal,
        /// Name on the begin token
        name: String,
        /// Index of the begin token
        index: usize,
    },
    /// Type capture found no `END_X` with the type's name.
    MissingEnd {
        /// The end signal searched for
        signal: Signal,
        /// Type name
        name: String,
        /// Index of the begin token
        index: usize,
    },
    /// A token with CONSTANT presence but no constant value.
    MissingConstantValue {
        /// Token name
        name: String,
        /// Index of the token
        index: usize,
    },
    /// A constant enum field whose value names none of the enum's values.
    UnknownConstantValue {
        /// Field name
        field: String,
        /// Referenced value text
        value: String,
    },
    /// The header structure lacks one of its fixed encodings.
    MissingHeaderField {
        /// Name of the missing encoding
        name: &'static str,
    },
    /// Two different definitions were captured under one type name.
    ConflictingType {
        /// Type name
        name: String,
    },
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrError::EmptyMessage { message_id } => {
                write!(f, "message {message_id} has no tokens")
            }
            IrError::NotAMessage {
                message_id,
                first,
                last,
            } => write!(
                f,
                "message {message_id} must be framed by BEGIN_MESSAGE/END_MESSAGE, found {first}..{last}"
            ),
            IrError::UnmatchedEnd {
                signal,
                name,
                index,
            } => write!(f, "unmatched {signal} '{name}' at token {index}"),
            IrError::UnclosedBegin {
                signal,
                name,
                index,
            } => write!(f, "{signal} '{name}' at token {index} is never closed"),
            IrError::MissingEnd {
                signal,
                name,
                index,
            } => write!(
                f,
                "no {signal} found for type '{name}' starting at token {index}"
            ),
            IrError::MissingConstantValue { name, index } => write!(
                f,
                "token '{name}' at index {index} is constant but has no constant value"
            ),
            IrError::UnknownConstantValue { field, value } => write!(
                f,
                "constant field '{field}' refers to '{value}', which is not a value of its enum"
            ),
            IrError::MissingHeaderField { name } => {
                write!(f, "header structure has no '{name}' encoding")
            }
            IrError::ConflictingType { name } => {
                write!(f, "type '{name}' is defined twice with different layouts")
            }
        }
    }
}

impl core::error::Error for IrError {}

/// Failure to read or write the serialized IR form.
#[derive(Debug, Clone, PartialEq)]
pub enum IrCodecError {
    /// Input ended inside a record.
    UnexpectedEof {
        /// Position of the read that failed
        pos: usize,
    },
    /// A code byte outside its enumeration.
    UnknownCode {
        /// Which field the code belongs to
        field: &'static str,
        /// The offending code
        code: u8,
        /// Position of the code byte
        pos: usize,
    },
    /// A string field longer than [`MAX_STRING_LENGTH`](crate::serial::MAX_STRING_LENGTH).
    StringTooLong {
        /// Which field was too long
        field: &'static str,
        /// Its length in bytes
        len: usize,
    },
    /// A string field that is not UTF-8.
    InvalidUtf8 {
        /// Position of the string data
        pos: usize,
    },
    /// Value text that does not parse as the token's primitive type.
    InvalidValue(ParseValueError),
    /// No composite to use as the header structure.
    MissingHeader,
    /// The decoded tokens failed IR construction.
    Ir(IrError),
}

impl fmt::Display for IrCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrCodecError::UnexpectedEof { pos } => {
                write!(f, "unexpected end of input at position {pos}")
            }
            IrCodecError::UnknownCode { field, code, pos } => {
                write!(f, "unknown {field} code {code} at position {pos}")
            }
            IrCodecError::StringTooLong { field, len } => {
                write!(f, "{field} is {len} bytes, longer than the 65534 byte limit")
            }
            IrCodecError::InvalidUtf8 { pos } => {
                write!(f, "invalid UTF-8 in string at position {pos}")
            }
            IrCodecError::InvalidValue(err) => write!(f, "invalid value: {err}"),
            IrCodecError::MissingHeader => f.write_str("no header composite in IR"),
            IrCodecError::Ir(err) => write!(f, "malformed IR: {err}"),
        }
    }
}

impl core::error::Error for IrCodecError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            IrCodecError::InvalidValue(err) => Some(err),
            IrCodecError::Ir(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IrError> for IrCodecError {
    fn from(err: IrError) -> Self {
        IrCodecError::Ir(err)
    }
}

impl From<ParseValueError> for IrCodecError {
    fn from(err: ParseValueError) -> Self {
        IrCodecError::InvalidValue(err)
    }
}
