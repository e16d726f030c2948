//! Reading and writing single primitives in a byte buffer.

use sbe_ir::{ByteOrder, Encoding, PrimitiveType, PrimitiveValue, Token};

use crate::OtfError;

fn window<const N: usize>(buffer: &[u8], index: usize, byte_order: ByteOrder) -> Result<[u8; N], OtfError> {
    let end = index
        .checked_add(N)
        .filter(|&end| end <= buffer.len())
        .ok_or(OtfError::OutOfBounds {
            index,
            width: N,
            len: buffer.len(),
        })?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&buffer[index..end]);
    if byte_order == ByteOrder::BigEndian {
        bytes.reverse();
    }
    Ok(bytes)
}

/// Read one `primitive_type` at `index`.
///
/// Signed integers come back as [`PrimitiveValue::Int`], unsigned integers
/// and `char` as [`PrimitiveValue::UInt`], floats widened to
/// [`PrimitiveValue::Float`].
pub fn read_primitive(
    buffer: &[u8],
    index: usize,
    primitive_type: PrimitiveType,
    byte_order: ByteOrder,
) -> Result<PrimitiveValue, OtfError> {
    let b = byte_order;
    let value = match primitive_type {
        PrimitiveType::Char | PrimitiveType::Uint8 => {
            PrimitiveValue::UInt(window::<1>(buffer, index, b)?[0] as u64)
        }
        PrimitiveType::Int8 => PrimitiveValue::Int(i8::from_le_bytes(window(buffer, index, b)?) as i64),
        PrimitiveType::Int16 => PrimitiveValue::Int(i16::from_le_bytes(window(buffer, index, b)?) as i64),
        PrimitiveType::Int32 => PrimitiveValue::Int(i32::from_le_bytes(window(buffer, index, b)?) as i64),
        PrimitiveType::Int64 => PrimitiveValue::Int(i64::from_le_bytes(window(buffer, index, b)?)),
        PrimitiveType::Uint16 => PrimitiveValue::UInt(u16::from_le_bytes(window(buffer, index, b)?) as u64),
        PrimitiveType::Uint32 => PrimitiveValue::UInt(u32::from_le_bytes(window(buffer, index, b)?) as u64),
        PrimitiveType::Uint64 => PrimitiveValue::UInt(u64::from_le_bytes(window(buffer, index, b)?)),
        PrimitiveType::Float => PrimitiveValue::Float(f32::from_le_bytes(window(buffer, index, b)?) as f64),
        PrimitiveType::Double => PrimitiveValue::Float(f64::from_le_bytes(window(buffer, index, b)?)),
    };
    Ok(value)
}

/// Write `value` as one `primitive_type` at `index`.
///
/// Integers are truncated to the type's width; floats are narrowed for
/// `float`. Byte strings cannot be written.
pub fn write_primitive(
    buffer: &mut [u8],
    index: usize,
    primitive_type: PrimitiveType,
    byte_order: ByteOrder,
    value: &PrimitiveValue,
) -> Result<(), OtfError> {
    let unwritable = || OtfError::UnwritableValue {
        primitive_type,
        value: value.clone(),
    };
    let le = match (primitive_type, value) {
        (_, PrimitiveValue::Bytes(_)) => return Err(unwritable()),
        (PrimitiveType::Float, v) => (v.as_f64().ok_or_else(unwritable)? as f32).to_le_bytes().to_vec(),
        (PrimitiveType::Double, v) => v.as_f64().ok_or_else(unwritable)?.to_le_bytes().to_vec(),
        (ty, v) => v.as_u64().ok_or_else(unwritable)?.to_le_bytes()[..ty.size()].to_vec(),
    };

    let width = le.len();
    let len = buffer.len();
    let target = index
        .checked_add(width)
        .and_then(|end| buffer.get_mut(index..end))
        .ok_or(OtfError::OutOfBounds {
            index,
            width,
            len,
        })?;
    target.copy_from_slice(&le);
    if byte_order == ByteOrder::BigEndian {
        target.reverse();
    }
    Ok(())
}

/// Read an integer encoding (a group count, a var data length) as `u64`.
///
/// Signed values are reinterpreted bit for bit.
pub fn read_unsigned(buffer: &[u8], index: usize, token: &Token) -> Result<u64, OtfError> {
    let encoding: &Encoding = token.encoding();
    let primitive_type = encoding
        .primitive_type()
        .ok_or_else(|| OtfError::MissingPrimitiveType {
            name: token.name().to_string(),
        })?;
    if primitive_type.is_float() {
        return Err(OtfError::NotAnInteger {
            name: token.name().to_string(),
        });
    }
    let value = read_primitive(buffer, index, primitive_type, encoding.byte_order())?;
    value.as_u64().ok_or_else(|| OtfError::NotAnInteger {
        name: token.name().to_string(),
    })
}

/// Offset of a token that must sit at a fixed position.
pub(crate) fn fixed_offset(token: &Token) -> Result<usize, OtfError> {
    usize::try_from(token.offset()).map_err(|_| OtfError::NegativeOffset {
        name: token.name().to_string(),
        offset: token.offset(),
    })
}

/// Encoded length of a token that must have a fixed size.
pub(crate) fn fixed_length(token: &Token) -> Result<usize, OtfError> {
    usize::try_from(token.encoded_length()).map_err(|_| OtfError::VariableLength {
        name: token.name().to_string(),
    })
}

/// `len` bytes starting at `index`.
pub(crate) fn slice(buffer: &[u8], index: usize, len: usize) -> Result<&[u8], OtfError> {
    index
        .checked_add(len)
        .and_then(|end| buffer.get(index..end))
        .ok_or(OtfError::OutOfBounds {
            index,
            width: len,
            len: buffer.len(),
        })
}
