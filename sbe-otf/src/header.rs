use sbe_ir::{HeaderStructure, Token};

use crate::OtfError;
use crate::types::{fixed_offset, read_unsigned};

/// The decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Root block length used by the producer.
    pub block_length: usize,
    /// Message template id.
    pub template_id: i64,
    /// Schema id.
    pub schema_id: u64,
    /// Schema version the producer encoded with (the acting version).
    pub version: i32,
}

/// Reads the message header that prefixes every message.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    encoded_length: usize,
    block_length: Token,
    template_id: Token,
    schema_id: Token,
    schema_version: Token,
}

impl HeaderDecoder {
    /// Decoder for the header described by `header`.
    pub fn new(header: &HeaderStructure) -> Self {
        Self {
            encoded_length: header.encoded_length(),
            block_length: header.block_length().clone(),
            template_id: header.template_id().clone(),
            schema_id: header.schema_id().clone(),
            schema_version: header.schema_version().clone(),
        }
    }

    /// Size of the header in bytes; the message body starts this far past
    /// the header offset.
    pub fn encoded_length(&self) -> usize {
        self.encoded_length
    }

    /// Template id of the message whose header is at `offset`.
    pub fn template_id(&self, buffer: &[u8], offset: usize) -> Result<i64, OtfError> {
        Ok(read(buffer, offset, &self.template_id)? as i64)
    }

    /// Schema id of the message whose header is at `offset`.
    pub fn schema_id(&self, buffer: &[u8], offset: usize) -> Result<u64, OtfError> {
        read(buffer, offset, &self.schema_id)
    }

    /// Schema version of the message whose header is at `offset`.
    pub fn schema_version(&self, buffer: &[u8], offset: usize) -> Result<i32, OtfError> {
        Ok(read(buffer, offset, &self.schema_version)? as i32)
    }

    /// Root block length of the message whose header is at `offset`.
    pub fn block_length(&self, buffer: &[u8], offset: usize) -> Result<usize, OtfError> {
        Ok(read(buffer, offset, &self.block_length)? as usize)
    }

    /// All four header fields.
    pub fn decode(&self, buffer: &[u8], offset: usize) -> Result<MessageHeader, OtfError> {
        Ok(MessageHeader {
            block_length: self.block_length(buffer, offset)?,
            template_id: self.template_id(buffer, offset)?,
            schema_id: self.schema_id(buffer, offset)?,
            version: self.schema_version(buffer, offset)?,
        })
    }
}

fn read(buffer: &[u8], offset: usize, token: &Token) -> Result<u64, OtfError> {
    read_unsigned(buffer, offset.saturating_add(fixed_offset(token)?), token)
}
