use crate::{Encoding, Presence, Signal};

/// One node of a flattened schema.
///
/// Tokens are plain value records. Once an [`Ir`](crate::Ir) has been built
/// they are only ever handed out by shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub(crate) signal: Signal,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) id: i32,
    pub(crate) version: i32,
    pub(crate) encoded_length: i32,
    pub(crate) offset: i32,
    pub(crate) component_token_count: i32,
    pub(crate) encoding: Encoding,
}

impl Token {
    /// Offset or length of constructs only positioned at decode time.
    pub const VARIABLE_LENGTH: i32 = -1;

    /// Id of tokens that carry no schema id.
    pub const INVALID_ID: i32 = -1;

    /// Start building a token with the given signal and name.
    pub fn builder(signal: Signal, name: impl Into<String>) -> TokenBuilder {
        TokenBuilder {
            token: Token {
                signal,
                name: name.into(),
                description: None,
                id: Self::INVALID_ID,
                version: 0,
                encoded_length: 0,
                offset: 0,
                component_token_count: 1,
                encoding: Encoding::default(),
            },
        }
    }

    /// A builder starting from a copy of this token.
    pub fn to_builder(&self) -> TokenBuilder {
        TokenBuilder {
            token: self.clone(),
        }
    }

    /// Structural role.
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Schema id (message template id, field id), or [`Token::INVALID_ID`].
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Schema version that introduced this token.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Size in bytes of the construct, or [`Token::VARIABLE_LENGTH`].
    ///
    /// For a message or group this is the block length.
    pub fn encoded_length(&self) -> i32 {
        self.encoded_length
    }

    /// Byte offset within the enclosing block or composite, or
    /// [`Token::VARIABLE_LENGTH`].
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Number of tokens spanned, inclusive, by a `Begin*`/`End*` pair;
    /// `1` for leaves.
    pub fn component_token_count(&self) -> usize {
        self.component_token_count.max(1) as usize
    }

    /// Wire encoding.
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Number of primitive elements in the encoded length.
    pub fn array_length(&self) -> usize {
        match self.encoding.primitive_type {
            Some(ty) if self.encoded_length > 0 => self.encoded_length as usize / ty.size(),
            _ => 1,
        }
    }

    /// Whether the encoding has CONSTANT presence.
    pub fn is_constant_encoding(&self) -> bool {
        self.encoding.presence == Presence::Constant
    }

    /// Whether the encoding has OPTIONAL presence.
    pub fn is_optional_encoding(&self) -> bool {
        self.encoding.presence == Presence::Optional
    }

    pub(crate) fn set_encoded_length(&mut self, encoded_length: i32) {
        self.encoded_length = encoded_length;
    }

    pub(crate) fn set_component_token_count(&mut self, count: i32) {
        self.component_token_count = count;
    }

    pub(crate) fn set_presence(&mut self, presence: Presence) {
        self.encoding.presence = presence;
    }
}

/// Builder for [`Token`].
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    token: Token,
}

impl TokenBuilder {
    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.token.description = Some(description.into());
        self
    }

    /// Set the schema id.
    pub fn id(mut self, id: i32) -> Self {
        self.token.id = id;
        self
    }

    /// Set the introducing version.
    pub fn version(mut self, version: i32) -> Self {
        self.token.version = version;
        self
    }

    /// Set the encoded length.
    pub fn encoded_length(mut self, encoded_length: i32) -> Self {
        self.token.encoded_length = encoded_length;
        self
    }

    /// Set the byte offset.
    pub fn offset(mut self, offset: i32) -> Self {
        self.token.offset = offset;
        self
    }

    /// Set the span. Normally left to [`IrBuilder`](crate::IrBuilder).
    pub fn component_token_count(mut self, count: i32) -> Self {
        self.token.component_token_count = count;
        self
    }

    /// Set the encoding.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.token.encoding = encoding;
        self
    }

    /// Finish the token.
    pub fn build(self) -> Token {
        self.token
    }
}
