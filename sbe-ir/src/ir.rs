use indexmap::IndexMap;

use crate::{Component, HeaderStructure, IrError, Presence, Signal, Token};

/// What to do when two captured types with the same name differ in layout.
///
/// Identical re-captures (the same type used by several fields) always keep
/// the first definition. An enum already compressed to a constant value, as
/// found in a decoded IR, only fills a name that has no definition yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateTypePolicy {
    /// The later capture replaces the earlier one.
    #[default]
    LastWins,
    /// Fail the build if the two captures differ in layout.
    Reject,
}

/// Options applied while building an [`Ir`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrConfig {
    /// Collapse the dotted namespace into a single `_`-joined segment.
    pub collapse_namespaces: bool,
    /// Handling of duplicate type names.
    pub duplicate_types: DuplicateTypePolicy,
}

/// Accumulates message token lists and produces an [`Ir`].
///
/// Each [`add_message`](IrBuilder::add_message) call normalizes its token
/// list in three passes:
///
/// 1. **Type capture**: every composite, enum and set range is recorded in
///    the type registry under its name (nested composites too).
/// 2. **Constant-enum compression**: a CONSTANT field wrapping an enum keeps
///    only the valid value it refers to, with zero encoded length.
/// 3. **Span computation**: every `BEGIN_X`/`END_X` pair gets its inclusive
///    token count written onto both ends.
#[derive(Debug, Clone)]
pub struct IrBuilder {
    config: IrConfig,
    package_name: String,
    namespace_name: Option<String>,
    id: i32,
    version: i32,
    semantic_version: Option<String>,
    header_tokens: Vec<Token>,
    messages_by_id: IndexMap<i64, Vec<Token>>,
    types_by_name: IndexMap<String, Vec<Token>>,
}

impl IrBuilder {
    /// Start an IR for `package_name` whose messages share `header_tokens`.
    pub fn new(package_name: impl Into<String>, header_tokens: Vec<Token>) -> Self {
        Self {
            config: IrConfig::default(),
            package_name: package_name.into(),
            namespace_name: None,
            id: 0,
            version: 0,
            semantic_version: None,
            header_tokens,
            messages_by_id: IndexMap::new(),
            types_by_name: IndexMap::new(),
        }
    }

    /// Set build options.
    pub fn config(mut self, config: IrConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the namespace, used in place of the package name when present.
    pub fn namespace_name(mut self, namespace_name: impl Into<String>) -> Self {
        self.namespace_name = Some(namespace_name.into());
        self
    }

    /// Set the schema id.
    pub fn schema_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    /// Set the schema version.
    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Set the semantic version.
    pub fn semantic_version(mut self, semantic_version: impl Into<String>) -> Self {
        self.semantic_version = Some(semantic_version.into());
        self
    }

    /// Normalize `tokens` and register them as message `message_id`.
    ///
    /// `tokens` must be offset-resolved and framed by `BEGIN_MESSAGE` /
    /// `END_MESSAGE`. On error nothing is registered.
    pub fn add_message(&mut self, message_id: i64, mut tokens: Vec<Token>) -> Result<(), IrError> {
        validate_message(message_id, &tokens)?;

        let mut captured = Vec::new();
        capture_types(&tokens, 0, tokens.len(), &mut captured)?;
        compress_constant_enums(&mut tokens)?;
        count_component_tokens(&mut tokens)?;

        let mut types = IndexMap::new();
        for (name, mut type_tokens) in captured {
            count_component_tokens(&mut type_tokens)?;
            let existing = types.get(&name).or_else(|| self.types_by_name.get(&name));
            if let Some(existing) = existing {
                // a compressed enum only stands in until the full definition shows up
                if same_layout(existing, &type_tokens) || is_compressed_enum(&type_tokens) {
                    continue;
                }
                if !is_compressed_enum(existing) {
                    if self.config.duplicate_types == DuplicateTypePolicy::Reject {
                        return Err(IrError::ConflictingType { name });
                    }
                    debug!(type_name = %name, "type captured twice with different layouts, last wins");
                }
            }
            types.insert(name, type_tokens);
        }
        self.types_by_name.extend(types);

        trace!(message_id, tokens = tokens.len(), "added message");
        if self.messages_by_id.insert(message_id, tokens).is_some() {
            debug!(message_id, "message id registered twice, keeping the later one");
        }
        Ok(())
    }

    /// Finish the IR.
    pub fn build(self) -> Result<Ir, IrError> {
        let mut header_tokens = self.header_tokens;
        count_component_tokens(&mut header_tokens)?;
        let header_structure = HeaderStructure::new(header_tokens)?;

        let applicable = self
            .namespace_name
            .as_deref()
            .unwrap_or(&self.package_name);
        let namespaces = if self.config.collapse_namespaces {
            vec![applicable.replace('.', "_")]
        } else {
            applicable.split('.').map(str::to_string).collect()
        };

        debug!(
            package = %self.package_name,
            messages = self.messages_by_id.len(),
            types = self.types_by_name.len(),
            "built IR"
        );

        Ok(Ir {
            package_name: self.package_name,
            namespace_name: self.namespace_name,
            id: self.id,
            version: self.version,
            semantic_version: self.semantic_version,
            namespaces,
            header_structure,
            messages_by_id: self.messages_by_id,
            types_by_name: self.types_by_name,
        })
    }
}

/// Intermediate representation of a compiled schema.
///
/// Immutable once built; share it by reference (or in an `Arc`) across any
/// number of concurrent decoders.
#[derive(Debug, Clone)]
pub struct Ir {
    package_name: String,
    namespace_name: Option<String>,
    id: i32,
    version: i32,
    semantic_version: Option<String>,
    namespaces: Vec<String>,
    header_structure: HeaderStructure,
    messages_by_id: IndexMap<i64, Vec<Token>>,
    types_by_name: IndexMap<String, Vec<Token>>,
}

impl Ir {
    /// Tokens of message `message_id`.
    pub fn message(&self, message_id: i64) -> Option<&[Token]> {
        self.messages_by_id.get(&message_id).map(Vec::as_slice)
    }

    /// Tokens of the composite, enum or set named `name`.
    pub fn type_by_name(&self, name: &str) -> Option<&[Token]> {
        self.types_by_name.get(name).map(Vec::as_slice)
    }

    /// All messages, in registration order.
    pub fn messages(&self) -> impl Iterator<Item = (i64, &[Token])> {
        self.messages_by_id.iter().map(|(id, t)| (*id, t.as_slice()))
    }

    /// All captured types, in first-capture order.
    pub fn types(&self) -> impl Iterator<Item = (&str, &[Token])> {
        self.types_by_name
            .iter()
            .map(|(name, t)| (name.as_str(), t.as_slice()))
    }

    /// The message header shared by every message.
    pub fn header_structure(&self) -> &HeaderStructure {
        &self.header_structure
    }

    /// Package name.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Namespace name, if set.
    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace_name.as_deref()
    }

    /// Namespace if set, otherwise the package name.
    pub fn applicable_namespace(&self) -> &str {
        self.namespace_name.as_deref().unwrap_or(&self.package_name)
    }

    /// Namespace segments, collapsed to one when
    /// [`IrConfig::collapse_namespaces`] was set.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Schema id.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Schema version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Semantic version, if set.
    pub fn semantic_version(&self) -> Option<&str> {
        self.semantic_version.as_deref()
    }
}

fn validate_message(message_id: i64, tokens: &[Token]) -> Result<(), IrError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(IrError::EmptyMessage { message_id });
    };
    if tokens.len() < 2
        || first.signal() != Signal::BeginMessage
        || last.signal() != Signal::EndMessage
    {
        return Err(IrError::NotAMessage {
            message_id,
            first: first.signal(),
            last: last.signal(),
        });
    }
    for (index, token) in tokens.iter().enumerate() {
        if token.is_constant_encoding() && token.encoding().const_value().is_none() {
            return Err(IrError::MissingConstantValue {
                name: token.name().to_string(),
                index,
            });
        }
    }
    Ok(())
}

/// Record every composite, enum and set in `tokens[begin..end]`.
fn capture_types(
    tokens: &[Token],
    begin: usize,
    end: usize,
    captured: &mut Vec<(String, Vec<Token>)>,
) -> Result<(), IrError> {
    let mut i = begin;
    while i < end {
        let token = &tokens[i];
        match token.signal() {
            Signal::BeginComposite => {
                let type_end = capture_type(tokens, i, Signal::EndComposite, captured)?;
                capture_types(tokens, i + 1, type_end, captured)?;
                i = type_end;
            }
            Signal::BeginEnum => i = capture_type(tokens, i, Signal::EndEnum, captured)?,
            Signal::BeginSet => i = capture_type(tokens, i, Signal::EndSet, captured)?,
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

/// An enum reduced by an earlier build to the single value of a constant field.
fn is_compressed_enum(tokens: &[Token]) -> bool {
    tokens.first().is_some_and(|t| t.signal() == Signal::BeginEnum)
        && tokens
            .iter()
            .any(|t| t.signal() == Signal::ValidValue && t.is_constant_encoding())
}

/// Record the type starting at `index`; returns the index of its end token.
fn capture_type(
    tokens: &[Token],
    index: usize,
    end_signal: Signal,
    captured: &mut Vec<(String, Vec<Token>)>,
) -> Result<usize, IrError> {
    let name = tokens[index].name();
    let end = tokens[index + 1..]
        .iter()
        .position(|t| t.signal() == end_signal && t.name() == name)
        .map(|p| index + 1 + p)
        .ok_or_else(|| IrError::MissingEnd {
            signal: end_signal,
            name: name.to_string(),
            index,
        })?;

    trace!(type_name = name, begin = index, end, "captured type");
    captured.push((name.to_string(), tokens[index..=end].to_vec()));
    Ok(end)
}

/// Whether a constant's value text (`Model.C`, or just `C`) names `value_name`.
fn refers_to(value_ref: &str, value_name: &str) -> bool {
    match value_ref.strip_suffix(value_name) {
        Some(prefix) => prefix.is_empty() || prefix.ends_with('.'),
        None => false,
    }
}

fn compress_constant_enums(tokens: &mut Vec<Token>) -> Result<(), IrError> {
    let input = core::mem::take(tokens);
    let mut iter = input.into_iter().enumerate().peekable();

    while let Some((_, mut token)) = iter.next() {
        if token.signal() == Signal::Encoding && token.is_constant_encoding() {
            token.set_encoded_length(0);
        }

        let wraps_enum = token.signal() == Signal::BeginField
            && token.is_constant_encoding()
            && iter
                .peek()
                .is_some_and(|(_, next)| next.signal() == Signal::BeginEnum);
        if !wraps_enum {
            tokens.push(token);
            continue;
        }

        let value_ref = token
            .encoding()
            .const_value()
            .map(|v| v.to_schema_text(None))
            .unwrap_or_default();
        let field_name = token.name().to_string();
        tokens.push(token);

        let Some((enum_index, mut begin_enum)) = iter.next() else {
            break;
        };
        begin_enum.set_encoded_length(0);
        let enum_name = begin_enum.name().to_string();
        tokens.push(begin_enum);

        let mut kept = false;
        loop {
            let Some((_, mut next)) = iter.next() else {
                return Err(IrError::MissingEnd {
                    signal: Signal::EndEnum,
                    name: enum_name,
                    index: enum_index,
                });
            };
            if next.signal() == Signal::EndEnum {
                next.set_encoded_length(0);
                tokens.push(next);
                break;
            }
            if !kept && refers_to(&value_ref, next.name()) {
                next.set_encoded_length(0);
                next.set_presence(Presence::Constant);
                kept = true;
                tokens.push(next);
            }
        }

        if !kept {
            return Err(IrError::UnknownConstantValue {
                field: field_name,
                value: value_ref,
            });
        }
        trace!(field = %field_name, value = %value_ref, "compressed constant enum");
    }
    Ok(())
}

/// Write the inclusive span of every `BEGIN_X … END_X` pair onto both ends.
///
/// Re-running on an already processed list yields the same counts.
pub fn count_component_tokens(tokens: &mut [Token]) -> Result<(), IrError> {
    let mut stacks: [Vec<usize>; Component::COUNT] = Default::default();

    for i in 0..tokens.len() {
        let signal = tokens[i].signal();
        if let Some(component) = signal.begins() {
            stacks[component.index()].push(i);
        } else if let Some(component) = signal.ends() {
            let begin = stacks[component.index()].pop().ok_or_else(|| IrError::UnmatchedEnd {
                signal,
                name: tokens[i].name().to_string(),
                index: i,
            })?;
            let count = (i - begin + 1) as i32;
            tokens[begin].set_component_token_count(count);
            tokens[i].set_component_token_count(count);
        }
    }

    if let Some(&index) = stacks.iter().filter_map(|stack| stack.first()).min() {
        return Err(IrError::UnclosedBegin {
            signal: tokens[index].signal(),
            name: tokens[index].name().to_string(),
            index,
        });
    }
    Ok(())
}

/// Layout equality for duplicate type detection. The offsets of the
/// outermost begin/end pair, and all ids and versions, depend on where the
/// type is used.
fn same_layout(a: &[Token], b: &[Token]) -> bool {
    let last = a.len().saturating_sub(1);
    a.len() == b.len()
        && a.iter().zip(b).enumerate().all(|(i, (x, y))| {
            x.signal() == y.signal()
                && x.name() == y.name()
                && x.encoded_length() == y.encoded_length()
                && x.encoding() == y.encoding()
                && (i == 0 || i == last || x.offset() == y.offset())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(signal: Signal, name: &str) -> Token {
        Token::builder(signal, name).build()
    }

    #[test]
    fn refers_to_matches_whole_names() {
        assert!(refers_to("Model.C", "C"));
        assert!(refers_to("C", "C"));
        assert!(!refers_to("Model.AC", "C"));
        assert!(!refers_to("Model.C", "B"));
    }

    #[test]
    fn spans_are_inclusive_on_both_ends() {
        let mut tokens = vec![
            token(Signal::BeginMessage, "m"),
            token(Signal::BeginField, "f"),
            token(Signal::Encoding, "e"),
            token(Signal::EndField, "f"),
            token(Signal::EndMessage, "m"),
        ];
        count_component_tokens(&mut tokens).unwrap();
        let spans: Vec<_> = tokens.iter().map(Token::component_token_count).collect();
        assert_eq!(spans, [5, 3, 1, 3, 5]);
    }

    #[test]
    fn unmatched_end_is_reported() {
        let mut tokens = vec![
            token(Signal::BeginMessage, "m"),
            token(Signal::EndField, "f"),
            token(Signal::EndMessage, "m"),
        ];
        let err = count_component_tokens(&mut tokens).unwrap_err();
        assert_eq!(
            err,
            IrError::UnmatchedEnd {
                signal: Signal::EndField,
                name: "f".to_string(),
                index: 1,
            }
        );
    }

    #[test]
    fn unclosed_begin_is_reported() {
        let mut tokens = vec![
            token(Signal::BeginMessage, "m"),
            token(Signal::BeginGroup, "g"),
            token(Signal::EndMessage, "m"),
        ];
        let err = count_component_tokens(&mut tokens).unwrap_err();
        assert!(matches!(err, IrError::UnclosedBegin { index: 1, .. }));
    }
}
