use core::fmt;

/// Structural role of a [`Token`](crate::Token) in a flattened schema.
///
/// Structural kinds come in `Begin*`/`End*` pairs that nest without
/// interleaving. [`Signal::ValidValue`], [`Signal::Choice`] and
/// [`Signal::Encoding`] are leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Start of a message.
    BeginMessage,
    /// End of a message.
    EndMessage,
    /// Start of a composite type.
    BeginComposite,
    /// End of a composite type.
    EndComposite,
    /// Start of a field in a fixed block.
    BeginField,
    /// End of a field in a fixed block.
    EndField,
    /// Start of a repeating group.
    BeginGroup,
    /// End of a repeating group.
    EndGroup,
    /// Start of an enum type.
    BeginEnum,
    /// One value of an enum.
    ValidValue,
    /// End of an enum type.
    EndEnum,
    /// Start of a bitset type.
    BeginSet,
    /// One bit of a bitset.
    Choice,
    /// End of a bitset type.
    EndSet,
    /// Start of variable-length data.
    BeginVarData,
    /// End of variable-length data.
    EndVarData,
    /// A primitive encoding.
    Encoding,
}

/// The construct a `Begin*`/`End*` signal delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// [`Signal::BeginMessage`] / [`Signal::EndMessage`]
    Message,
    /// [`Signal::BeginComposite`] / [`Signal::EndComposite`]
    Composite,
    /// [`Signal::BeginField`] / [`Signal::EndField`]
    Field,
    /// [`Signal::BeginGroup`] / [`Signal::EndGroup`]
    Group,
    /// [`Signal::BeginEnum`] / [`Signal::EndEnum`]
    Enum,
    /// [`Signal::BeginSet`] / [`Signal::EndSet`]
    Set,
    /// [`Signal::BeginVarData`] / [`Signal::EndVarData`]
    VarData,
}

impl Component {
    /// Number of distinct components.
    pub const COUNT: usize = 7;

    /// Dense index, used for per-component stacks.
    pub const fn index(self) -> usize {
        match self {
            Component::Message => 0,
            Component::Composite => 1,
            Component::Field => 2,
            Component::Group => 3,
            Component::Enum => 4,
            Component::Set => 5,
            Component::VarData => 6,
        }
    }

    /// The signal that opens this component.
    pub const fn begin(self) -> Signal {
        match self {
            Component::Message => Signal::BeginMessage,
            Component::Composite => Signal::BeginComposite,
            Component::Field => Signal::BeginField,
            Component::Group => Signal::BeginGroup,
            Component::Enum => Signal::BeginEnum,
            Component::Set => Signal::BeginSet,
            Component::VarData => Signal::BeginVarData,
        }
    }

    /// The signal that closes this component.
    pub const fn end(self) -> Signal {
        match self {
            Component::Message => Signal::EndMessage,
            Component::Composite => Signal::EndComposite,
            Component::Field => Signal::EndField,
            Component::Group => Signal::EndGroup,
            Component::Enum => Signal::EndEnum,
            Component::Set => Signal::EndSet,
            Component::VarData => Signal::EndVarData,
        }
    }
}

impl Signal {
    /// All signals, in wire-code order.
    pub const ALL: [Signal; 17] = [
        Signal::BeginMessage,
        Signal::EndMessage,
        Signal::BeginComposite,
        Signal::EndComposite,
        Signal::BeginField,
        Signal::EndField,
        Signal::BeginGroup,
        Signal::EndGroup,
        Signal::BeginEnum,
        Signal::ValidValue,
        Signal::EndEnum,
        Signal::BeginSet,
        Signal::Choice,
        Signal::EndSet,
        Signal::BeginVarData,
        Signal::EndVarData,
        Signal::Encoding,
    ];

    /// If this signal opens a component, which one.
    pub const fn begins(self) -> Option<Component> {
        match self {
            Signal::BeginMessage => Some(Component::Message),
            Signal::BeginComposite => Some(Component::Composite),
            Signal::BeginField => Some(Component::Field),
            Signal::BeginGroup => Some(Component::Group),
            Signal::BeginEnum => Some(Component::Enum),
            Signal::BeginSet => Some(Component::Set),
            Signal::BeginVarData => Some(Component::VarData),
            _ => None,
        }
    }

    /// If this signal closes a component, which one.
    pub const fn ends(self) -> Option<Component> {
        match self {
            Signal::EndMessage => Some(Component::Message),
            Signal::EndComposite => Some(Component::Composite),
            Signal::EndField => Some(Component::Field),
            Signal::EndGroup => Some(Component::Group),
            Signal::EndEnum => Some(Component::Enum),
            Signal::EndSet => Some(Component::Set),
            Signal::EndVarData => Some(Component::VarData),
            _ => None,
        }
    }

    /// Code used by the serialized IR form.
    pub const fn code(self) -> u8 {
        match self {
            Signal::BeginMessage => 1,
            Signal::EndMessage => 2,
            Signal::BeginComposite => 3,
            Signal::EndComposite => 4,
            Signal::BeginField => 5,
            Signal::EndField => 6,
            Signal::BeginGroup => 7,
            Signal::EndGroup => 8,
            Signal::BeginEnum => 9,
            Signal::ValidValue => 10,
            Signal::EndEnum => 11,
            Signal::BeginSet => 12,
            Signal::Choice => 13,
            Signal::EndSet => 14,
            Signal::BeginVarData => 15,
            Signal::EndVarData => 16,
            Signal::Encoding => 17,
        }
    }

    /// Inverse of [`Signal::code`].
    pub const fn from_code(code: u8) -> Option<Signal> {
        if code == 0 || code as usize > Self::ALL.len() {
            return None;
        }
        Some(Self::ALL[code as usize - 1])
    }

    /// Upper snake case name, as used in schema tooling output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Signal::BeginMessage => "BEGIN_MESSAGE",
            Signal::EndMessage => "END_MESSAGE",
            Signal::BeginComposite => "BEGIN_COMPOSITE",
            Signal::EndComposite => "END_COMPOSITE",
            Signal::BeginField => "BEGIN_FIELD",
            Signal::EndField => "END_FIELD",
            Signal::BeginGroup => "BEGIN_GROUP",
            Signal::EndGroup => "END_GROUP",
            Signal::BeginEnum => "BEGIN_ENUM",
            Signal::ValidValue => "VALID_VALUE",
            Signal::EndEnum => "END_ENUM",
            Signal::BeginSet => "BEGIN_SET",
            Signal::Choice => "CHOICE",
            Signal::EndSet => "END_SET",
            Signal::BeginVarData => "BEGIN_VAR_DATA",
            Signal::EndVarData => "END_VAR_DATA",
            Signal::Encoding => "ENCODING",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dense_and_invertible() {
        for (i, signal) in Signal::ALL.iter().enumerate() {
            assert_eq!(signal.code() as usize, i + 1);
            assert_eq!(Signal::from_code(signal.code()), Some(*signal));
        }
        assert_eq!(Signal::from_code(0), None);
        assert_eq!(Signal::from_code(18), None);
    }

    #[test]
    fn begin_and_end_pair_up() {
        for signal in Signal::ALL {
            if let Some(component) = signal.begins() {
                assert_eq!(component.begin(), signal);
                assert_eq!(component.end().ends(), Some(component));
            }
        }
        assert_eq!(Signal::Encoding.begins(), None);
        assert_eq!(Signal::Choice.ends(), None);
    }
}
