use crate::{IrError, Signal, Token};

/// The message header composite prefixed to every message on the wire.
///
/// Holds the header tokens and the positions of its four fixed encodings.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderStructure {
    tokens: Vec<Token>,
    block_length: usize,
    template_id: usize,
    schema_id: usize,
    schema_version: usize,
}

impl HeaderStructure {
    /// Name of the block length encoding.
    pub const BLOCK_LENGTH: &'static str = "blockLength";
    /// Name of the template id encoding.
    pub const TEMPLATE_ID: &'static str = "templateId";
    /// Name of the schema id encoding.
    pub const SCHEMA_ID: &'static str = "schemaId";
    /// Name of the schema version encoding.
    pub const SCHEMA_VERSION: &'static str = "version";

    /// Locate the fixed encodings in `tokens`.
    pub fn new(tokens: Vec<Token>) -> Result<Self, IrError> {
        let find = |name: &'static str| {
            tokens
                .iter()
                .position(|t| t.signal() == Signal::Encoding && t.name() == name)
                .ok_or(IrError::MissingHeaderField { name })
        };
        let block_length = find(Self::BLOCK_LENGTH)?;
        let template_id = find(Self::TEMPLATE_ID)?;
        let schema_id = find(Self::SCHEMA_ID)?;
        let schema_version = find(Self::SCHEMA_VERSION)?;
        Ok(Self {
            tokens,
            block_length,
            template_id,
            schema_id,
            schema_version,
        })
    }

    /// All header tokens, composite begin/end included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Encoding of the root block length.
    pub fn block_length(&self) -> &Token {
        &self.tokens[self.block_length]
    }

    /// Encoding of the template (message) id.
    pub fn template_id(&self) -> &Token {
        &self.tokens[self.template_id]
    }

    /// Encoding of the schema id.
    pub fn schema_id(&self) -> &Token {
        &self.tokens[self.schema_id]
    }

    /// Encoding of the schema version.
    pub fn schema_version(&self) -> &Token {
        &self.tokens[self.schema_version]
    }

    /// Total encoded size of the header in bytes.
    pub fn encoded_length(&self) -> usize {
        match self.tokens.first() {
            Some(first) if first.signal() == Signal::BeginComposite && first.encoded_length() > 0 => {
                first.encoded_length() as usize
            }
            _ => self
                .tokens
                .iter()
                .filter(|t| t.signal() == Signal::Encoding && t.offset() >= 0)
                .map(|t| t.offset() as usize + t.encoded_length().max(0) as usize)
                .max()
                .unwrap_or(0),
        }
    }
}
