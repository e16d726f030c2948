//! Token-driven traversal of one message.
//!
//! The message token list is walked in three sections, matching the wire
//! layout: the root block fields, the repeating groups, then the var data.
//! Fields are offset-addressed within their block: a field's type token
//! carries its offset in the block, and composite members carry offsets
//! relative to the composite. Groups and var data are read sequentially
//! after the block, whose size is the producer's (acting) block length.

use sbe_ir::{PrimitiveType, PrimitiveValue, Signal, Token};
use tracing::{debug, trace};

use crate::types::{fixed_length, fixed_offset, read_primitive, read_unsigned, slice};
use crate::{FieldValue, OtfError, TokenListener};

const MESSAGE_LAYOUT: &str = "a message framed by BEGIN_MESSAGE/END_MESSAGE";
const CONSTRUCT_LAYOUT: &str = "a closed BEGIN/END construct";
const GROUP_LAYOUT: &str = "a group led by a blockLength/numInGroup dimensions composite";
const VAR_DATA_LAYOUT: &str = "var data led by a length/varData composite";
const CONSTANT_ENUM_LAYOUT: &str = "a constant enum holding its valid value";

/// Decode the message whose root block starts at `offset`.
///
/// `tokens` is the message's token list from the [`Ir`](sbe_ir::Ir);
/// `acting_version` and `block_length` are the producer's schema version and
/// root block length, normally read from the message header. Events are
/// delivered to `listener` in document order.
///
/// Returns the buffer index just past the message.
pub fn decode<L: TokenListener + ?Sized>(
    buffer: &[u8],
    offset: usize,
    acting_version: i32,
    block_length: usize,
    tokens: &[Token],
    listener: &mut L,
) -> Result<usize, OtfError> {
    let mut decoder = Decoder {
        buffer,
        acting_version,
        listener,
        scope: Vec::new(),
    };
    decoder
        .message(tokens, offset, block_length)
        .map_err(|source| OtfError::InScope {
            path: decoder.path(),
            source: Box::new(source),
        })
}

/// One decode call: the cursor lives in the call stack, names of the open
/// message/composite/group scopes in `scope`.
struct Decoder<'a, L: ?Sized> {
    buffer: &'a [u8],
    acting_version: i32,
    listener: &'a mut L,
    scope: Vec<&'a str>,
}

fn at(base: usize, token: &Token) -> Result<usize, OtfError> {
    Ok(base.saturating_add(fixed_offset(token)?))
}

fn layout(token: &Token, expected: &'static str) -> OtfError {
    OtfError::UnexpectedLayout {
        name: token.name().to_string(),
        expected,
    }
}

/// The tokens of the construct opened at `begin`, begin and end included.
fn span(tokens: &[Token], begin: usize) -> Result<&[Token], OtfError> {
    let token = &tokens[begin];
    let end = begin + token.component_token_count();
    match tokens.get(begin..end) {
        Some(range) if range.len() >= 2 => Ok(range),
        _ => Err(layout(token, CONSTRUCT_LAYOUT)),
    }
}

impl<'a, L: TokenListener + ?Sized> Decoder<'a, L> {
    fn path(&self) -> String {
        self.scope.join(".")
    }

    fn message(&mut self, tokens: &'a [Token], offset: usize, block_length: usize) -> Result<usize, OtfError> {
        let (begin, end) = match tokens {
            [begin, .., end]
                if begin.signal() == Signal::BeginMessage && end.signal() == Signal::EndMessage =>
            {
                (begin, end)
            }
            [first, ..] => return Err(layout(first, MESSAGE_LAYOUT)),
            [] => {
                return Err(OtfError::UnexpectedLayout {
                    name: String::new(),
                    expected: MESSAGE_LAYOUT,
                });
            }
        };
        let end_index = tokens.len() - 1;

        self.listener.on_begin_message(begin);
        self.scope.push(begin.name());
        trace!(
            message = begin.name(),
            offset,
            block_length,
            acting_version = self.acting_version,
            "decoding message"
        );

        let groups_at = self.fields(tokens, 1, end_index, offset)?;
        let (index, var_data_at) =
            self.groups(tokens, groups_at, end_index, offset.saturating_add(block_length))?;
        let index = self.var_data(tokens, var_data_at, end_index, index)?;

        self.scope.pop();
        self.listener.on_end_message(end);
        Ok(index)
    }

    /// Decode the consecutive fields from `index` of a block starting at
    /// `block`; returns the token index past them.
    fn fields(&mut self, tokens: &'a [Token], mut index: usize, end: usize, block: usize) -> Result<usize, OtfError> {
        while index < end {
            let field = &tokens[index];
            if field.signal() != Signal::BeginField {
                break;
            }
            let next = index + field.component_token_count();
            let type_index = index + 1;
            let type_token = &tokens[type_index];
            trace!(scope = %self.path(), field = field.name(), token = index, "field");

            match type_token.signal() {
                Signal::BeginComposite => self.composite(field, tokens, type_index, block)?,
                Signal::BeginEnum => self.enumeration(field, tokens, type_index, block)?,
                Signal::BeginSet => self.bit_set(field, tokens, type_index, block)?,
                Signal::Encoding => self.encoding(field, type_token, block)?,
                _ => {}
            }
            index = next;
        }
        Ok(index)
    }

    fn composite(&mut self, field: &'a Token, tokens: &'a [Token], begin: usize, base: usize) -> Result<(), OtfError> {
        let range = span(tokens, begin)?;
        let composite = &range[0];
        let start = at(base, composite)?;

        self.listener.on_begin_composite(field, range);
        self.scope.push(composite.name());

        let end = begin + range.len() - 1;
        let mut index = begin + 1;
        while index < end {
            let member = &tokens[index];
            match member.signal() {
                Signal::BeginComposite => self.composite(field, tokens, index, start)?,
                Signal::BeginEnum => self.enumeration(field, tokens, index, start)?,
                Signal::BeginSet => self.bit_set(field, tokens, index, start)?,
                Signal::Encoding => self.encoding(field, member, start)?,
                _ => {}
            }
            index += member.component_token_count();
        }

        self.scope.pop();
        self.listener.on_end_composite(field, range);
        Ok(())
    }

    fn encoding(&mut self, field: &Token, type_token: &Token, base: usize) -> Result<(), OtfError> {
        let value = self.value(field, type_token, base)?;
        self.listener.on_encoding(field, type_token, &value);
        Ok(())
    }

    fn enumeration(&mut self, field: &'a Token, tokens: &'a [Token], begin: usize, base: usize) -> Result<(), OtfError> {
        let range = span(tokens, begin)?;
        let valid_values = &range[1..range.len() - 1];

        let value = if field.is_constant_encoding() {
            // compressed at build time down to the one value the field names
            let constant = valid_values
                .first()
                .and_then(|v| v.encoding().const_value())
                .ok_or_else(|| layout(field, CONSTANT_ENUM_LAYOUT))?;
            FieldValue::Constant(constant.clone())
        } else {
            self.value(field, &range[0], base)?
        };

        let matched = value.first().and_then(|raw| {
            valid_values.iter().find(|v| {
                v.encoding()
                    .const_value()
                    .is_some_and(|c| c.same_integer(raw))
            })
        });
        trace!(scope = %self.path(), field = field.name(), matched = ?matched.map(Token::name), "enum");
        self.listener.on_enum(field, range, &value, matched);
        Ok(())
    }

    fn bit_set(&mut self, field: &'a Token, tokens: &'a [Token], begin: usize, base: usize) -> Result<(), OtfError> {
        let range = span(tokens, begin)?;
        let value = self.value(field, &range[0], base)?;
        self.listener.on_bit_set(field, range, &value);
        Ok(())
    }

    /// Value of `type_token`: synthesized for constants and for fields newer
    /// than the acting version, otherwise read at `base` + its offset.
    fn value(&self, field: &Token, type_token: &Token, base: usize) -> Result<FieldValue, OtfError> {
        if field.is_constant_encoding() || type_token.is_constant_encoding() {
            let constant = type_token
                .encoding()
                .const_value()
                .or_else(|| field.encoding().const_value());
            if let Some(constant) = constant {
                return Ok(FieldValue::Constant(constant.clone()));
            }
        }

        let primitive_type =
            type_token
                .encoding()
                .primitive_type()
                .ok_or_else(|| OtfError::MissingPrimitiveType {
                    name: type_token.name().to_string(),
                })?;

        if self.acting_version < field.version().max(type_token.version()) {
            let null = type_token
                .encoding()
                .applicable_null_value()
                .unwrap_or_else(|| primitive_type.null_value());
            return Ok(FieldValue::NotPresent(null));
        }

        let offset = at(base, type_token)?;
        let count = type_token.array_length();
        let byte_order = type_token.encoding().byte_order();
        if primitive_type == PrimitiveType::Char && count > 1 {
            let bytes = slice(self.buffer, offset, count)?;
            return Ok(FieldValue::Present(vec![PrimitiveValue::Bytes(bytes.to_vec())]));
        }

        let values = (0..count)
            .map(|i| {
                let index = offset.saturating_add(i * primitive_type.size());
                read_primitive(self.buffer, index, primitive_type, byte_order)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldValue::Present(values))
    }

    /// Decode the consecutive groups from `index`, reading from
    /// `buffer_index`; returns the buffer index and token index past them.
    fn groups(
        &mut self,
        tokens: &'a [Token],
        mut index: usize,
        end: usize,
        mut buffer_index: usize,
    ) -> Result<(usize, usize), OtfError> {
        while index < end {
            let group = &tokens[index];
            if group.signal() != Signal::BeginGroup {
                break;
            }
            let range = span(tokens, index)?;
            let group_end = index + range.len() - 1;
            let (dimensions, block_length_token, num_in_group_token) = match range {
                [_, dimensions, block_length, num_in_group, ..]
                    if dimensions.signal() == Signal::BeginComposite
                        && block_length.signal() == Signal::Encoding
                        && num_in_group.signal() == Signal::Encoding =>
                {
                    (dimensions, block_length, num_in_group)
                }
                _ => return Err(layout(group, GROUP_LAYOUT)),
            };

            let (block_length, num_in_group) = if group.version() <= self.acting_version {
                let block_length = read_unsigned(
                    self.buffer,
                    at(buffer_index, block_length_token)?,
                    block_length_token,
                )?;
                let num_in_group = read_unsigned(
                    self.buffer,
                    at(buffer_index, num_in_group_token)?,
                    num_in_group_token,
                )?;
                buffer_index = buffer_index.saturating_add(fixed_length(dimensions)?);
                (usize::try_from(block_length).unwrap_or(usize::MAX), num_in_group)
            } else {
                (0, 0)
            };

            let remaining = self.buffer.len().saturating_sub(buffer_index) as u64;
            let needed = num_in_group.saturating_mul(block_length as u64);
            if needed > remaining {
                return Err(OtfError::OutOfBounds {
                    index: buffer_index,
                    width: usize::try_from(needed).unwrap_or(usize::MAX),
                    len: self.buffer.len(),
                });
            }

            debug!(scope = %self.path(), group = group.name(), num_in_group, block_length, "group");
            self.listener.on_group_header(group, num_in_group);

            let fields_at = index + 1 + dimensions.component_token_count();
            for group_index in 0..num_in_group {
                self.listener.on_begin_group(group, group_index, num_in_group);
                self.scope.push(group.name());

                let groups_at = self.fields(tokens, fields_at, group_end, buffer_index)?;
                let (next, var_data_at) = self.groups(
                    tokens,
                    groups_at,
                    group_end,
                    buffer_index.saturating_add(block_length),
                )?;
                buffer_index = self.var_data(tokens, var_data_at, group_end, next)?;

                self.scope.pop();
                self.listener.on_end_group(group, group_index, num_in_group);
            }
            index = group_end + 1;
        }
        Ok((buffer_index, index))
    }

    /// Decode the consecutive var data fields from `index`, reading from
    /// `buffer_index`; returns the buffer index past them.
    fn var_data(&mut self, tokens: &'a [Token], mut index: usize, end: usize, mut buffer_index: usize) -> Result<usize, OtfError> {
        while index < end {
            let field = &tokens[index];
            if field.signal() != Signal::BeginVarData {
                break;
            }
            let range = span(tokens, index)?;
            let (length_token, data_token) = match range {
                [_, _, length, data, ..]
                    if length.signal() == Signal::Encoding && data.signal() == Signal::Encoding =>
                {
                    (length, data)
                }
                _ => return Err(layout(field, VAR_DATA_LAYOUT)),
            };

            let data: &'a [u8] = if field.version() <= self.acting_version {
                let length = read_unsigned(self.buffer, at(buffer_index, length_token)?, length_token)?;
                let start = at(buffer_index, data_token)?;
                let data = slice(self.buffer, start, usize::try_from(length).unwrap_or(usize::MAX))?;
                buffer_index = start + data.len();
                data
            } else {
                &[]
            };

            trace!(scope = %self.path(), field = field.name(), length = data.len(), "var data");
            self.listener.on_var_data(field, data, data_token);
            index += range.len();
        }
        Ok(buffer_index)
    }
}
