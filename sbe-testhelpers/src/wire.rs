//! Little-endian buffer writer for building test messages.

/// Appends little-endian primitives to a growing buffer.
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a `u8`.
    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    /// Append a little-endian `u16`.
    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Append a little-endian `u32`.
    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Append a little-endian `u64`.
    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Append a little-endian `i32`.
    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Append a little-endian `f32`.
    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Append raw bytes.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append `n` zero bytes.
    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.buf.resize(self.buf.len() + n, 0);
        self
    }

    /// Append a message header (`blockLength`, `templateId`, `schemaId`,
    /// `version`, all `u16`), matching [`fixtures::header_tokens`](crate::fixtures::header_tokens).
    pub fn header(&mut self, block_length: u16, template_id: u16, schema_id: u16, version: u16) -> &mut Self {
        self.u16(block_length).u16(template_id).u16(schema_id).u16(version)
    }

    /// Append a group dimension header (`blockLength`, `numInGroup`, both `u16`).
    pub fn group_header(&mut self, block_length: u16, num_in_group: u16) -> &mut Self {
        self.u16(block_length).u16(num_in_group)
    }

    /// Append var data with a `u16` length prefix.
    pub fn var_data(&mut self, data: &[u8]) -> &mut Self {
        self.u16(data.len() as u16).bytes(data)
    }

    /// Take the buffer.
    pub fn finish(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.buf)
    }
}
