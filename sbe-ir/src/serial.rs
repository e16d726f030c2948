//! Binary form of an [`Ir`] for reuse across processes.
//!
//! ## Wire format
//!
//! All integers are little-endian. Strings are a `u16` byte count followed
//! by UTF-8 bytes; an absent value is an empty string.
//!
//! ```text
//! frame:  schema_id(i32) | ir_version(i32) | schema_version(i32)
//!         | package_name | namespace_name | semantic_version
//! token:  offset(i32) | encoded_length(i32) | id(i32) | version(i32)
//!         | component_token_count(i32)
//!         | signal(u8) | primitive_type(u8) | byte_order(u8) | presence(u8)
//!         | name | const_value | min_value | max_value | null_value
//!         | character_encoding | epoch | time_unit | semantic_type
//!         | description
//! ```
//!
//! The frame is followed by the header tokens, then every message's tokens
//! back to back.

use crate::{
    ByteOrder, Encoding, Ir, IrBuilder, IrCodecError, IrConfig, Presence, PrimitiveType,
    PrimitiveValue, Signal, Token,
};

/// Version of this format, written into the frame.
pub const IR_VERSION: i32 = 0;

/// Longest string a field can hold.
pub const MAX_STRING_LENGTH: usize = 65_534;

/// Size of the fixed part of the frame record.
pub const FRAME_BLOCK_LENGTH: usize = 12;

/// Size of the fixed part of a token record.
pub const TOKEN_BLOCK_LENGTH: usize = 24;

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn str(&mut self, field: &'static str, s: Option<&str>) -> Result<(), IrCodecError> {
        let bytes = s.unwrap_or_default().as_bytes();
        if bytes.len() > MAX_STRING_LENGTH {
            return Err(IrCodecError::StringTooLong {
                field,
                len: bytes.len(),
            });
        }
        self.buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn value(
        &mut self,
        field: &'static str,
        value: Option<&PrimitiveValue>,
        primitive_type: Option<PrimitiveType>,
    ) -> Result<(), IrCodecError> {
        let text = value.map(|v| v.to_schema_text(primitive_type));
        self.str(field, text.as_deref())
    }

    fn token(&mut self, token: &Token) -> Result<(), IrCodecError> {
        let encoding = token.encoding();
        let ty = encoding.primitive_type();

        self.i32(token.offset());
        self.i32(token.encoded_length());
        self.i32(token.id());
        self.i32(token.version());
        self.i32(token.component_token_count() as i32);
        self.u8(token.signal().code());
        self.u8(ty.map_or(0, PrimitiveType::code));
        self.u8(encoding.byte_order().code());
        self.u8(encoding.presence().code());

        self.str("name", Some(token.name()))?;
        self.value("const_value", encoding.const_value(), ty)?;
        self.value("min_value", encoding.min_value(), ty)?;
        self.value("max_value", encoding.max_value(), ty)?;
        self.value("null_value", encoding.null_value(), ty)?;
        self.str("character_encoding", encoding.character_encoding())?;
        self.str("epoch", encoding.epoch())?;
        self.str("time_unit", encoding.time_unit())?;
        self.str("semantic_type", encoding.semantic_type())?;
        self.str("description", token.description())
    }
}

/// Serialize `ir`: frame, header tokens, then all message tokens.
pub fn encode_ir(ir: &Ir) -> Result<Vec<u8>, IrCodecError> {
    let mut w = Writer { buf: Vec::new() };

    w.i32(ir.id());
    w.i32(IR_VERSION);
    w.i32(ir.version());
    w.str("package_name", Some(ir.package_name()))?;
    w.str("namespace_name", ir.namespace_name())?;
    w.str("semantic_version", ir.semantic_version())?;

    for token in ir.header_structure().tokens() {
        w.token(token)?;
    }
    let mut count = ir.header_structure().tokens().len();
    for (_, tokens) in ir.messages() {
        for token in tokens {
            w.token(token)?;
        }
        count += tokens.len();
    }

    debug!(bytes = w.buf.len(), tokens = count, "encoded IR");
    Ok(w.buf)
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], IrCodecError> {
        let end = self.pos + len;
        if end > self.input.len() {
            return Err(IrCodecError::UnexpectedEof { pos: self.pos });
        }
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn i32(&mut self) -> Result<i32, IrCodecError> {
        let b = self.bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u8(&mut self) -> Result<u8, IrCodecError> {
        Ok(self.bytes(1)?[0])
    }

    fn str(&mut self) -> Result<Option<String>, IrCodecError> {
        let b = self.bytes(2)?;
        let len = u16::from_le_bytes([b[0], b[1]]) as usize;
        let pos = self.pos;
        let data = self.bytes(len)?;
        if data.is_empty() {
            return Ok(None);
        }
        core::str::from_utf8(data)
            .map(|s| Some(s.to_string()))
            .map_err(|_| IrCodecError::InvalidUtf8 { pos })
    }

    fn value(
        &mut self,
        primitive_type: Option<PrimitiveType>,
    ) -> Result<Option<PrimitiveValue>, IrCodecError> {
        match self.str()? {
            Some(text) => Ok(Some(PrimitiveValue::parse(&text, primitive_type)?)),
            None => Ok(None),
        }
    }

    fn code<T>(
        &mut self,
        field: &'static str,
        decode: impl FnOnce(u8) -> Option<T>,
    ) -> Result<T, IrCodecError> {
        let pos = self.pos;
        let code = self.u8()?;
        decode(code).ok_or(IrCodecError::UnknownCode { field, code, pos })
    }

    fn token(&mut self) -> Result<Token, IrCodecError> {
        let offset = self.i32()?;
        let encoded_length = self.i32()?;
        let id = self.i32()?;
        let version = self.i32()?;
        let component_token_count = self.i32()?;
        let signal = self.code("signal", Signal::from_code)?;
        let primitive_type = self.code("primitive type", |c| PrimitiveType::from_code(c).ok())?;
        let byte_order = self.code("byte order", ByteOrder::from_code)?;
        let presence = self.code("presence", Presence::from_code)?;

        let name = self.str()?.unwrap_or_default();
        let encoding = Encoding {
            presence,
            primitive_type,
            byte_order,
            const_value: self.value(primitive_type)?,
            min_value: self.value(primitive_type)?,
            max_value: self.value(primitive_type)?,
            null_value: self.value(primitive_type)?,
            character_encoding: self.str()?,
            epoch: self.str()?,
            time_unit: self.str()?,
            semantic_type: self.str()?,
        };
        let description = self.str()?;

        Ok(Token {
            signal,
            name,
            description,
            id,
            version,
            encoded_length,
            offset,
            component_token_count,
            encoding,
        })
    }
}

/// Index of the token closing the construct opened at `begin`.
fn matching_end(tokens: &[Token], begin: usize, end_signal: Signal) -> Option<usize> {
    let name = tokens[begin].name();
    tokens[begin + 1..]
        .iter()
        .position(|t| t.signal() == end_signal && t.name() == name)
        .map(|p| begin + 1 + p)
}

/// Rebuild an [`Ir`] from [`encode_ir`] output.
///
/// The first composite becomes the header structure; every
/// `BEGIN_MESSAGE … END_MESSAGE` range after it is added as a message keyed
/// by its begin token's id.
pub fn decode_ir(input: &[u8], config: IrConfig) -> Result<Ir, IrCodecError> {
    let mut r = Reader { input, pos: 0 };

    let schema_id = r.i32()?;
    let ir_version = r.i32()?;
    let schema_version = r.i32()?;
    let package_name = r.str()?.unwrap_or_default();
    let namespace_name = r.str()?;
    let semantic_version = r.str()?;
    trace!(schema_id, ir_version, schema_version, "decoded IR frame");

    let mut tokens = Vec::new();
    while !r.is_empty() {
        tokens.push(r.token()?);
    }

    let header_end = match tokens.first() {
        Some(first) if first.signal() == Signal::BeginComposite => {
            matching_end(&tokens, 0, Signal::EndComposite).ok_or(IrCodecError::MissingHeader)?
        }
        _ => return Err(IrCodecError::MissingHeader),
    };
    let mut rest = tokens.split_off(header_end + 1);

    let mut builder = IrBuilder::new(package_name, tokens)
        .config(config)
        .schema_id(schema_id)
        .version(schema_version);
    if let Some(namespace_name) = namespace_name {
        builder = builder.namespace_name(namespace_name);
    }
    if let Some(semantic_version) = semantic_version {
        builder = builder.semantic_version(semantic_version);
    }

    while let Some(begin) = rest.iter().position(|t| t.signal() == Signal::BeginMessage) {
        let end = matching_end(&rest, begin, Signal::EndMessage).ok_or_else(|| {
            IrCodecError::Ir(crate::IrError::UnclosedBegin {
                signal: Signal::BeginMessage,
                name: rest[begin].name().to_string(),
                index: begin,
            })
        })?;
        let tail = rest.split_off(end + 1);
        let message: Vec<Token> = rest.drain(begin..).collect();
        let message_id = i64::from(message[0].id());
        builder.add_message(message_id, message)?;
        rest = tail;
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_record_layout() {
        let token = Token::builder(Signal::Encoding, "id")
            .id(7)
            .offset(4)
            .encoded_length(2)
            .encoding(Encoding::of(PrimitiveType::Uint16))
            .build();
        let mut w = Writer { buf: Vec::new() };
        w.token(&token).unwrap();

        assert_eq!(&w.buf[0..4], &4i32.to_le_bytes());
        assert_eq!(&w.buf[4..8], &2i32.to_le_bytes());
        assert_eq!(&w.buf[8..12], &7i32.to_le_bytes());
        assert_eq!(w.buf[20], Signal::Encoding.code());
        assert_eq!(w.buf[21], PrimitiveType::Uint16.code());
        assert_eq!(&w.buf[TOKEN_BLOCK_LENGTH..TOKEN_BLOCK_LENGTH + 4], &[2, 0, b'i', b'd']);
        // nine empty strings follow the name
        assert_eq!(w.buf.len(), TOKEN_BLOCK_LENGTH + 4 + 9 * 2);

        let mut r = Reader {
            input: &w.buf,
            pos: 0,
        };
        assert_eq!(r.token().unwrap(), token);
        assert!(r.is_empty());
    }

    #[test]
    fn oversized_string_is_rejected() {
        let long = "x".repeat(MAX_STRING_LENGTH + 1);
        let mut w = Writer { buf: Vec::new() };
        assert_eq!(
            w.str("name", Some(&long)),
            Err(IrCodecError::StringTooLong {
                field: "name",
                len: MAX_STRING_LENGTH + 1,
            })
        );
        assert!(w.str("name", Some(&long[1..])).is_ok());
    }

    #[test]
    fn unknown_signal_code() {
        let mut buf = vec![0u8; TOKEN_BLOCK_LENGTH];
        buf[20] = 99;
        let mut r = Reader { input: &buf, pos: 0 };
        assert_eq!(
            r.token().unwrap_err(),
            IrCodecError::UnknownCode {
                field: "signal",
                code: 99,
                pos: 20,
            }
        );
    }
}
