//! A listener that renders a decoded message as text, one line per field.

use core::fmt::Write;

use sbe_ir::{Signal, Token};
use tracing::warn;

use crate::{FieldValue, TextDecodeError, TokenListener};

/// Prints each field as `Scope.path.name=value`.
///
/// ```text
/// Car.serialNumber=1234
/// Car.available=T
/// Car.extras: sunRoof=false sportsPack=true cruiseControl=true
/// Car.engine.Booster.BoostType=NITROUS
/// Car.fuelFigures Group Header : numInGroup=3
/// Car.fuelFigures.speed=30
/// Car.make=Honda
/// ```
///
/// Top-level fields are named after their field; members of a composite
/// after their type token. An enum with no matching value prints `null`.
/// Var data is decoded with its character encoding (UTF-8, US-ASCII or
/// ISO-8859-1) and printed as hex when it has none. Text that cannot be
/// decoded is logged, recorded in [`errors`](Self::errors), and its line is
/// left out.
#[derive(Debug, Default)]
pub struct PrintingListener {
    out: String,
    scope: Vec<String>,
    composite_level: usize,
    errors: Vec<TextDecodeError>,
}

impl PrintingListener {
    /// An empty printer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far.
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Take the printed text.
    pub fn into_output(self) -> String {
        self.out
    }

    /// Var data fields whose text could not be decoded.
    pub fn errors(&self) -> &[TextDecodeError] {
        &self.errors
    }

    fn print_scope(&mut self) {
        for name in &self.scope {
            self.out.push_str(name);
        }
    }

    fn line(&mut self, name: &str, value: &str) {
        self.print_scope();
        let _ = writeln!(self.out, "{name}={value}");
    }

    /// Composite members and nested types print their own name; top-level
    /// constructs the field's.
    fn determine_name<'t>(&self, threshold: usize, field: &'t Token, tokens: &'t [Token]) -> &'t str {
        match tokens.first() {
            Some(first) if self.composite_level > threshold => first.name(),
            _ => field.name(),
        }
    }
}

impl TokenListener for PrintingListener {
    fn on_begin_message(&mut self, token: &Token) {
        self.scope.push(format!("{}.", token.name()));
    }

    fn on_end_message(&mut self, _token: &Token) {
        self.scope.pop();
    }

    fn on_encoding(&mut self, field: &Token, type_token: &Token, value: &FieldValue) {
        let name = if self.composite_level > 0 {
            type_token.name()
        } else {
            field.name()
        };
        let text = value.to_text(type_token.encoding().primitive_type());
        self.line(name, &text);
    }

    fn on_enum(&mut self, field: &Token, tokens: &[Token], _value: &FieldValue, matched: Option<&Token>) {
        let name = self.determine_name(0, field, tokens);
        self.line(name, matched.map_or("null", Token::name));
    }

    fn on_bit_set(&mut self, field: &Token, tokens: &[Token], value: &FieldValue) {
        let name = self.determine_name(0, field, tokens);
        let raw = value.first().and_then(|v| v.as_u64()).unwrap_or(0);

        self.print_scope();
        self.out.push_str(name);
        self.out.push(':');
        for choice in tokens.iter().filter(|t| t.signal() == Signal::Choice) {
            let bit = choice
                .encoding()
                .const_value()
                .and_then(|v| v.as_u64())
                .unwrap_or(u64::MAX);
            let set = bit < 64 && (raw >> bit) & 1 == 1;
            let _ = write!(self.out, " {}={set}", choice.name());
        }
        self.out.push('\n');
    }

    fn on_begin_composite(&mut self, field: &Token, tokens: &[Token]) {
        self.composite_level += 1;
        let name = self.determine_name(1, field, tokens);
        self.scope.push(format!("{name}."));
    }

    fn on_end_composite(&mut self, _field: &Token, _tokens: &[Token]) {
        self.composite_level = self.composite_level.saturating_sub(1);
        self.scope.pop();
    }

    fn on_group_header(&mut self, token: &Token, num_in_group: u64) {
        self.print_scope();
        let _ = writeln!(
            self.out,
            "{} Group Header : numInGroup={num_in_group}",
            token.name()
        );
    }

    fn on_begin_group(&mut self, token: &Token, _group_index: u64, _num_in_group: u64) {
        self.scope.push(format!("{}.", token.name()));
    }

    fn on_end_group(&mut self, _token: &Token, _group_index: u64, _num_in_group: u64) {
        self.scope.pop();
    }

    fn on_var_data(&mut self, field: &Token, data: &[u8], type_token: &Token) {
        match decode_text(field.name(), data, type_token.encoding().character_encoding()) {
            Ok(text) => self.line(field.name(), &text),
            Err(err) => {
                warn!(%err, "skipping var data field");
                self.errors.push(err);
            }
        }
    }
}

/// Decode var data bytes with the named character encoding.
///
/// Encoding names are matched case-insensitively; without one the bytes are
/// rendered as lowercase hex.
pub fn decode_text(field: &str, data: &[u8], character_encoding: Option<&str>) -> Result<String, TextDecodeError> {
    let Some(character_encoding) = character_encoding else {
        return Ok(data.iter().map(|b| format!("{b:02x}")).collect());
    };
    let invalid = |position: usize| TextDecodeError::Invalid {
        field: field.to_string(),
        character_encoding: character_encoding.to_string(),
        position,
    };

    match character_encoding.to_ascii_uppercase().as_str() {
        "UTF-8" | "UTF8" => core::str::from_utf8(data)
            .map(str::to_string)
            .map_err(|e| invalid(e.valid_up_to())),
        "US-ASCII" | "ASCII" => match data.iter().position(|b| !b.is_ascii()) {
            Some(position) => Err(invalid(position)),
            None => Ok(data.iter().map(|&b| char::from(b)).collect()),
        },
        "ISO-8859-1" | "LATIN1" => Ok(data.iter().map(|&b| char::from(b)).collect()),
        _ => Err(TextDecodeError::Unsupported {
            field: field.to_string(),
            character_encoding: character_encoding.to_string(),
        }),
    }
}
