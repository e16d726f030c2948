use core::fmt;

/// Scalar wire type of an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Single byte character.
    Char,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// IEEE 754 single precision.
    Float,
    /// IEEE 754 double precision.
    Double,
}

impl PrimitiveType {
    /// All primitive types, in wire-code order.
    pub const ALL: [PrimitiveType; 11] = [
        PrimitiveType::Char,
        PrimitiveType::Int8,
        PrimitiveType::Int16,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::Uint8,
        PrimitiveType::Uint16,
        PrimitiveType::Uint32,
        PrimitiveType::Uint64,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveType::Char | PrimitiveType::Int8 | PrimitiveType::Uint8 => 1,
            PrimitiveType::Int16 | PrimitiveType::Uint16 => 2,
            PrimitiveType::Int32 | PrimitiveType::Uint32 | PrimitiveType::Float => 4,
            PrimitiveType::Int64 | PrimitiveType::Uint64 | PrimitiveType::Double => 8,
        }
    }

    /// Schema name of the type (`uint16`, `char`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Char => "char",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Uint8 => "uint8",
            PrimitiveType::Uint16 => "uint16",
            PrimitiveType::Uint32 => "uint32",
            PrimitiveType::Uint64 => "uint64",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Look a type up by its schema name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    /// Code used by the serialized IR form. `0` is reserved for "no type".
    pub const fn code(self) -> u8 {
        match self {
            PrimitiveType::Char => 1,
            PrimitiveType::Int8 => 2,
            PrimitiveType::Int16 => 3,
            PrimitiveType::Int32 => 4,
            PrimitiveType::Int64 => 5,
            PrimitiveType::Uint8 => 6,
            PrimitiveType::Uint16 => 7,
            PrimitiveType::Uint32 => 8,
            PrimitiveType::Uint64 => 9,
            PrimitiveType::Float => 10,
            PrimitiveType::Double => 11,
        }
    }

    /// Inverse of [`PrimitiveType::code`]; `Ok(None)` for code `0`.
    pub const fn from_code(code: u8) -> Result<Option<Self>, u8> {
        match code {
            0 => Ok(None),
            1..=11 => Ok(Some(Self::ALL[code as usize - 1])),
            _ => Err(code),
        }
    }

    /// Whether values of this type are signed integers.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveType::Int8 | PrimitiveType::Int16 | PrimitiveType::Int32 | PrimitiveType::Int64
        )
    }

    /// Whether values of this type are floating point.
    pub const fn is_float(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    /// Sentinel used on the wire when an optional value is absent.
    pub fn null_value(self) -> PrimitiveValue {
        match self {
            PrimitiveType::Char => PrimitiveValue::UInt(0),
            PrimitiveType::Int8 => PrimitiveValue::Int(i8::MIN as i64),
            PrimitiveType::Int16 => PrimitiveValue::Int(i16::MIN as i64),
            PrimitiveType::Int32 => PrimitiveValue::Int(i32::MIN as i64),
            PrimitiveType::Int64 => PrimitiveValue::Int(i64::MIN),
            PrimitiveType::Uint8 => PrimitiveValue::UInt(u8::MAX as u64),
            PrimitiveType::Uint16 => PrimitiveValue::UInt(u16::MAX as u64),
            PrimitiveType::Uint32 => PrimitiveValue::UInt(u32::MAX as u64),
            PrimitiveType::Uint64 => PrimitiveValue::UInt(u64::MAX),
            PrimitiveType::Float | PrimitiveType::Double => PrimitiveValue::Float(f64::NAN),
        }
    }

    /// Smallest value that is not the null sentinel.
    pub fn min_value(self) -> PrimitiveValue {
        match self {
            PrimitiveType::Char => PrimitiveValue::UInt(0x20),
            PrimitiveType::Int8 => PrimitiveValue::Int(i8::MIN as i64 + 1),
            PrimitiveType::Int16 => PrimitiveValue::Int(i16::MIN as i64 + 1),
            PrimitiveType::Int32 => PrimitiveValue::Int(i32::MIN as i64 + 1),
            PrimitiveType::Int64 => PrimitiveValue::Int(i64::MIN + 1),
            PrimitiveType::Uint8
            | PrimitiveType::Uint16
            | PrimitiveType::Uint32
            | PrimitiveType::Uint64 => PrimitiveValue::UInt(0),
            PrimitiveType::Float => PrimitiveValue::Float(f32::MIN as f64),
            PrimitiveType::Double => PrimitiveValue::Float(f64::MIN),
        }
    }

    /// Largest value that is not the null sentinel.
    pub fn max_value(self) -> PrimitiveValue {
        match self {
            PrimitiveType::Char => PrimitiveValue::UInt(0x7e),
            PrimitiveType::Int8 => PrimitiveValue::Int(i8::MAX as i64),
            PrimitiveType::Int16 => PrimitiveValue::Int(i16::MAX as i64),
            PrimitiveType::Int32 => PrimitiveValue::Int(i32::MAX as i64),
            PrimitiveType::Int64 => PrimitiveValue::Int(i64::MAX),
            PrimitiveType::Uint8 => PrimitiveValue::UInt(u8::MAX as u64 - 1),
            PrimitiveType::Uint16 => PrimitiveValue::UInt(u16::MAX as u64 - 1),
            PrimitiveType::Uint32 => PrimitiveValue::UInt(u32::MAX as u64 - 1),
            PrimitiveType::Uint64 => PrimitiveValue::UInt(u64::MAX - 1),
            PrimitiveType::Float => PrimitiveValue::Float(f32::MAX as f64),
            PrimitiveType::Double => PrimitiveValue::Float(f64::MAX),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar value taken from a schema (constant, bound, null sentinel) or
/// decoded from a buffer.
///
/// Single characters are held as their character code; character arrays and
/// untyped schema text are held as bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer (also single `char` values).
    UInt(u64),
    /// Floating point, widened to `f64`.
    Float(f64),
    /// Byte string.
    Bytes(Vec<u8>),
}

/// Schema value text that does not parse as the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseValueError {
    /// The text that failed to parse.
    pub text: String,
    /// The requested type, if any.
    pub primitive_type: Option<PrimitiveType>,
}

impl fmt::Display for ParseValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primitive_type {
            Some(ty) => write!(f, "cannot parse {:?} as {ty}", self.text),
            None => write!(f, "cannot parse {:?}", self.text),
        }
    }
}

impl core::error::Error for ParseValueError {}

impl PrimitiveValue {
    /// Parse schema value text as `primitive_type`.
    ///
    /// Without a primitive type the text is kept verbatim as bytes, which is
    /// how constant field references such as `Model.C` are stored.
    pub fn parse(text: &str, primitive_type: Option<PrimitiveType>) -> Result<Self, ParseValueError> {
        let err = || ParseValueError {
            text: text.to_string(),
            primitive_type,
        };
        let Some(ty) = primitive_type else {
            return Ok(PrimitiveValue::Bytes(text.as_bytes().to_vec()));
        };
        let value = match ty {
            PrimitiveType::Char => {
                // a single character in the Latin-1 range is one wire byte
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if u32::from(c) <= 0xff => {
                        PrimitiveValue::UInt(u64::from(u32::from(c)))
                    }
                    _ => PrimitiveValue::Bytes(text.as_bytes().to_vec()),
                }
            }
            PrimitiveType::Int8
            | PrimitiveType::Int16
            | PrimitiveType::Int32
            | PrimitiveType::Int64 => PrimitiveValue::Int(text.trim().parse().map_err(|_| err())?),
            PrimitiveType::Uint8
            | PrimitiveType::Uint16
            | PrimitiveType::Uint32
            | PrimitiveType::Uint64 => PrimitiveValue::UInt(text.trim().parse().map_err(|_| err())?),
            PrimitiveType::Float | PrimitiveType::Double => {
                PrimitiveValue::Float(text.trim().parse().map_err(|_| err())?)
            }
        };
        Ok(value)
    }

    /// Render back to schema value text; inverse of [`PrimitiveValue::parse`].
    pub fn to_schema_text(&self, primitive_type: Option<PrimitiveType>) -> String {
        match (self, primitive_type) {
            (PrimitiveValue::UInt(code), Some(PrimitiveType::Char)) if *code <= 0xff => {
                char::from(*code as u8).to_string()
            }
            (PrimitiveValue::Bytes(bytes), _) => String::from_utf8_lossy(bytes).into_owned(),
            (other, _) => other.to_string(),
        }
    }

    /// Integer view of the value. Floats and byte strings have none.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrimitiveValue::Int(v) => Some(*v),
            PrimitiveValue::UInt(v) => Some(*v as i64),
            PrimitiveValue::Float(_) | PrimitiveValue::Bytes(_) => None,
        }
    }

    /// Unsigned view of the value, reinterpreting the bits of signed values.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PrimitiveValue::Int(v) => Some(*v as u64),
            PrimitiveValue::UInt(v) => Some(*v),
            PrimitiveValue::Float(_) | PrimitiveValue::Bytes(_) => None,
        }
    }

    /// Floating point view of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PrimitiveValue::Int(v) => Some(*v as f64),
            PrimitiveValue::UInt(v) => Some(*v as f64),
            PrimitiveValue::Float(v) => Some(*v),
            PrimitiveValue::Bytes(_) => None,
        }
    }

    /// Byte string view of the value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PrimitiveValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Whether two values denote the same integer, regardless of signedness.
    pub fn same_integer(&self, other: &PrimitiveValue) -> bool {
        match (self.as_u64(), other.as_u64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Int(v) => write!(f, "{v}"),
            PrimitiveValue::UInt(v) => write!(f, "{v}"),
            PrimitiveValue::Float(v) => write!(f, "{v}"),
            PrimitiveValue::Bytes(bytes) => {
                // char arrays are NUL padded on the wire
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                for &b in &bytes[..end] {
                    fmt::Write::write_char(f, char::from(b))?;
                }
                Ok(())
            }
        }
    }
}
