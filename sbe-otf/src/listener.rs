use sbe_ir::Token;

use crate::FieldValue;

/// Receives decode events in document order.
///
/// Every method has an empty default, so a listener only implements the
/// events it cares about. For a message the order is: begin message, the
/// root block fields, each group (header, then per entry begin / fields /
/// nested groups / var data / end), the var data fields, end message.
///
/// `field` is the `BEGIN_FIELD` token of the field being reported, also for
/// members of a composite. `tokens` slices hold the whole construct, begin
/// and end tokens included.
pub trait TokenListener {
    /// Start of a message.
    fn on_begin_message(&mut self, token: &Token) {
        let _ = token;
    }

    /// End of a message.
    fn on_end_message(&mut self, token: &Token) {
        let _ = token;
    }

    /// A primitive field or composite member, scalar or array.
    fn on_encoding(&mut self, field: &Token, type_token: &Token, value: &FieldValue) {
        let _ = (field, type_token, value);
    }

    /// An enum value. `matched` is the first valid value equal to the raw
    /// value, if any.
    fn on_enum(&mut self, field: &Token, tokens: &[Token], value: &FieldValue, matched: Option<&Token>) {
        let _ = (field, tokens, value, matched);
    }

    /// A bitset. `tokens` holds every choice so each bit can be tested.
    fn on_bit_set(&mut self, field: &Token, tokens: &[Token], value: &FieldValue) {
        let _ = (field, tokens, value);
    }

    /// Start of a composite; its members follow.
    fn on_begin_composite(&mut self, field: &Token, tokens: &[Token]) {
        let _ = (field, tokens);
    }

    /// End of a composite.
    fn on_end_composite(&mut self, field: &Token, tokens: &[Token]) {
        let _ = (field, tokens);
    }

    /// The dimensions of a repeating group, before its first entry.
    fn on_group_header(&mut self, token: &Token, num_in_group: u64) {
        let _ = (token, num_in_group);
    }

    /// Start of group entry `group_index`.
    fn on_begin_group(&mut self, token: &Token, group_index: u64, num_in_group: u64) {
        let _ = (token, group_index, num_in_group);
    }

    /// End of group entry `group_index`.
    fn on_end_group(&mut self, token: &Token, group_index: u64, num_in_group: u64) {
        let _ = (token, group_index, num_in_group);
    }

    /// Variable-length data. `data` borrows the payload from the buffer;
    /// `type_token` carries its character encoding.
    fn on_var_data(&mut self, field: &Token, data: &[u8], type_token: &Token) {
        let _ = (field, data, type_token);
    }
}
