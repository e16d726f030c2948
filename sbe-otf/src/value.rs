use sbe_ir::{PrimitiveType, PrimitiveValue};

/// The value of one field (or composite member) as seen by a listener.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Read from the buffer, one value per array element. A `char` array is
    /// read as a single [`PrimitiveValue::Bytes`].
    Present(Vec<PrimitiveValue>),
    /// Fixed by the schema; nothing was read.
    Constant(PrimitiveValue),
    /// Introduced after the acting version; carries the null value and
    /// nothing was read.
    NotPresent(PrimitiveValue),
}

impl FieldValue {
    /// The first (for scalars, the only) value.
    pub fn first(&self) -> Option<&PrimitiveValue> {
        match self {
            FieldValue::Present(values) => values.first(),
            FieldValue::Constant(value) | FieldValue::NotPresent(value) => Some(value),
        }
    }

    /// Whether the value came from the buffer.
    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    /// Render for display, array elements joined by `", "`.
    ///
    /// `char` values print as characters and `float` values at single
    /// precision.
    pub fn to_text(&self, primitive_type: Option<PrimitiveType>) -> String {
        match self {
            FieldValue::Present(values) => values
                .iter()
                .map(|v| render(v, primitive_type))
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Constant(value) | FieldValue::NotPresent(value) => render(value, primitive_type),
        }
    }
}

fn render(value: &PrimitiveValue, primitive_type: Option<PrimitiveType>) -> String {
    match (value, primitive_type) {
        (PrimitiveValue::UInt(0), Some(PrimitiveType::Char)) => String::new(),
        (PrimitiveValue::UInt(code), Some(PrimitiveType::Char)) if *code <= 0xff => {
            char::from(*code as u8).to_string()
        }
        (PrimitiveValue::Float(v), Some(PrimitiveType::Float)) => (*v as f32).to_string(),
        (value, _) => value.to_string(),
    }
}
