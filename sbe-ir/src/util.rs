//! Span-driven helpers for walking message token lists.
//!
//! A message body is laid out as fields, then groups, then var data. Each
//! `collect_*` function gathers the consecutive constructs of one kind
//! starting at `index` and returns the index just past them.

use crate::{Signal, Token};

/// Collect consecutive `BEGIN_FIELD` constructs.
pub fn collect_fields<'a>(tokens: &'a [Token], index: usize, fields: &mut Vec<&'a Token>) -> usize {
    collect(Signal::BeginField, tokens, index, fields)
}

/// Collect consecutive `BEGIN_GROUP` constructs.
pub fn collect_groups<'a>(tokens: &'a [Token], index: usize, groups: &mut Vec<&'a Token>) -> usize {
    collect(Signal::BeginGroup, tokens, index, groups)
}

/// Collect consecutive `BEGIN_VAR_DATA` constructs.
pub fn collect_var_data<'a>(
    tokens: &'a [Token],
    index: usize,
    var_data: &mut Vec<&'a Token>,
) -> usize {
    collect(Signal::BeginVarData, tokens, index, var_data)
}

/// Collect every token of the consecutive constructs opened by `signal`.
pub fn collect<'a>(
    signal: Signal,
    tokens: &'a [Token],
    mut index: usize,
    collected: &mut Vec<&'a Token>,
) -> usize {
    while let Some(token) = tokens.get(index) {
        if token.signal() != signal {
            break;
        }
        let limit = (index + token.component_token_count()).min(tokens.len());
        collected.extend(&tokens[index..limit]);
        index = limit;
    }
    index
}

/// The tokens between `BEGIN_MESSAGE` and `END_MESSAGE`.
pub fn message_body(tokens: &[Token]) -> &[Token] {
    match tokens.len() {
        0..=2 => &[],
        len => &tokens[1..len - 1],
    }
}

/// Index of the first `signal` token named `name` at or after `start`,
/// or the last index when there is none.
pub fn find_end_signal(tokens: &[Token], start: usize, signal: Signal, name: &str) -> usize {
    let last = tokens.len().saturating_sub(1);
    tokens
        .iter()
        .enumerate()
        .take(last)
        .skip(start)
        .find(|(_, t)| t.signal() == signal && t.name() == name)
        .map_or(last, |(i, _)| i)
}
