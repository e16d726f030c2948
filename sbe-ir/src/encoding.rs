use crate::{PrimitiveType, PrimitiveValue};

/// Whether a value must, may, or never appears on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Always present.
    #[default]
    Required,
    /// May carry the null sentinel.
    Optional,
    /// Fixed by the schema; occupies no wire bytes.
    Constant,
}

impl Presence {
    /// Code used by the serialized IR form.
    pub const fn code(self) -> u8 {
        match self {
            Presence::Required => 0,
            Presence::Optional => 1,
            Presence::Constant => 2,
        }
    }

    /// Inverse of [`Presence::code`].
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Presence::Required),
            1 => Some(Presence::Optional),
            2 => Some(Presence::Constant),
            _ => None,
        }
    }
}

/// Byte order of multi-byte primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    LittleEndian,
    /// Most significant byte first.
    BigEndian,
}

impl ByteOrder {
    /// Code used by the serialized IR form.
    pub const fn code(self) -> u8 {
        match self {
            ByteOrder::LittleEndian => 0,
            ByteOrder::BigEndian => 1,
        }
    }

    /// Inverse of [`ByteOrder::code`].
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ByteOrder::LittleEndian),
            1 => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }
}

/// How a single scalar is laid out on the wire, plus its schema metadata.
///
/// Structural tokens carry an encoding without a primitive type; they may
/// still use `presence` and `const_value` (a constant field token holds the
/// referenced value, e.g. `Model.C`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    pub(crate) presence: Presence,
    pub(crate) primitive_type: Option<PrimitiveType>,
    pub(crate) byte_order: ByteOrder,
    pub(crate) min_value: Option<PrimitiveValue>,
    pub(crate) max_value: Option<PrimitiveValue>,
    pub(crate) null_value: Option<PrimitiveValue>,
    pub(crate) const_value: Option<PrimitiveValue>,
    pub(crate) character_encoding: Option<String>,
    pub(crate) epoch: Option<String>,
    pub(crate) time_unit: Option<String>,
    pub(crate) semantic_type: Option<String>,
}

impl Encoding {
    /// Start building an encoding.
    pub fn builder() -> EncodingBuilder {
        EncodingBuilder::default()
    }

    /// Shorthand for a required encoding of `primitive_type`.
    pub fn of(primitive_type: PrimitiveType) -> Self {
        Self {
            primitive_type: Some(primitive_type),
            ..Self::default()
        }
    }

    /// Presence class.
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Primitive type, `None` for structural tokens.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        self.primitive_type
    }

    /// Byte order.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Explicit minimum, if the schema gave one.
    pub fn min_value(&self) -> Option<&PrimitiveValue> {
        self.min_value.as_ref()
    }

    /// Explicit maximum, if the schema gave one.
    pub fn max_value(&self) -> Option<&PrimitiveValue> {
        self.max_value.as_ref()
    }

    /// Explicit null sentinel, if the schema gave one.
    pub fn null_value(&self) -> Option<&PrimitiveValue> {
        self.null_value.as_ref()
    }

    /// Constant value for CONSTANT presence, or the value of a valid value /
    /// the bit position of a choice.
    pub fn const_value(&self) -> Option<&PrimitiveValue> {
        self.const_value.as_ref()
    }

    /// Character set of text data.
    pub fn character_encoding(&self) -> Option<&str> {
        self.character_encoding.as_deref()
    }

    /// Epoch of timestamp values.
    pub fn epoch(&self) -> Option<&str> {
        self.epoch.as_deref()
    }

    /// Time unit of timestamp values.
    pub fn time_unit(&self) -> Option<&str> {
        self.time_unit.as_deref()
    }

    /// Semantic tag from the schema (e.g. `Price`).
    pub fn semantic_type(&self) -> Option<&str> {
        self.semantic_type.as_deref()
    }

    /// Null sentinel: explicit, or the primitive type's default.
    pub fn applicable_null_value(&self) -> Option<PrimitiveValue> {
        self.null_value
            .clone()
            .or_else(|| self.primitive_type.map(PrimitiveType::null_value))
    }

    /// Minimum: explicit, or the primitive type's default.
    pub fn applicable_min_value(&self) -> Option<PrimitiveValue> {
        self.min_value
            .clone()
            .or_else(|| self.primitive_type.map(PrimitiveType::min_value))
    }

    /// Maximum: explicit, or the primitive type's default.
    pub fn applicable_max_value(&self) -> Option<PrimitiveValue> {
        self.max_value
            .clone()
            .or_else(|| self.primitive_type.map(PrimitiveType::max_value))
    }
}

/// Builder for [`Encoding`].
#[derive(Debug, Clone, Default)]
pub struct EncodingBuilder {
    encoding: Encoding,
}

impl EncodingBuilder {
    /// Set the presence class.
    pub fn presence(mut self, presence: Presence) -> Self {
        self.encoding.presence = presence;
        self
    }

    /// Set the primitive type.
    pub fn primitive_type(mut self, primitive_type: PrimitiveType) -> Self {
        self.encoding.primitive_type = Some(primitive_type);
        self
    }

    /// Set the byte order.
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.encoding.byte_order = byte_order;
        self
    }

    /// Set the minimum value.
    pub fn min_value(mut self, value: PrimitiveValue) -> Self {
        self.encoding.min_value = Some(value);
        self
    }

    /// Set the maximum value.
    pub fn max_value(mut self, value: PrimitiveValue) -> Self {
        self.encoding.max_value = Some(value);
        self
    }

    /// Set the null sentinel.
    pub fn null_value(mut self, value: PrimitiveValue) -> Self {
        self.encoding.null_value = Some(value);
        self
    }

    /// Set the constant value.
    pub fn const_value(mut self, value: PrimitiveValue) -> Self {
        self.encoding.const_value = Some(value);
        self
    }

    /// Set the character set.
    pub fn character_encoding(mut self, name: impl Into<String>) -> Self {
        self.encoding.character_encoding = Some(name.into());
        self
    }

    /// Set the epoch.
    pub fn epoch(mut self, epoch: impl Into<String>) -> Self {
        self.encoding.epoch = Some(epoch.into());
        self
    }

    /// Set the time unit.
    pub fn time_unit(mut self, time_unit: impl Into<String>) -> Self {
        self.encoding.time_unit = Some(time_unit.into());
        self
    }

    /// Set the semantic type.
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.encoding.semantic_type = Some(semantic_type.into());
        self
    }

    /// Finish the encoding.
    pub fn build(self) -> Encoding {
        self.encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applicable_values_fall_back_to_type_defaults() {
        let enc = Encoding::of(PrimitiveType::Uint16);
        assert_eq!(enc.applicable_null_value(), Some(PrimitiveValue::UInt(65535)));
        assert_eq!(enc.applicable_max_value(), Some(PrimitiveValue::UInt(65534)));

        let enc = Encoding::builder()
            .primitive_type(PrimitiveType::Uint16)
            .null_value(PrimitiveValue::UInt(0))
            .build();
        assert_eq!(enc.applicable_null_value(), Some(PrimitiveValue::UInt(0)));

        assert_eq!(Encoding::default().applicable_null_value(), None);
    }
}
