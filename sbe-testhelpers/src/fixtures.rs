//! Offset-resolved token lists, as a schema front end would produce them.
//!
//! The helpers follow the usual layout: a field's type token carries the
//! field's offset within its block, composite members carry offsets relative
//! to the composite, and groups/var data are positioned at decode time.
//!
//! [`car_message`] is a complete message exercising every construct, and
//! [`car_buffer`] writes a matching wire buffer.

use sbe_ir::{
    Encoding, Ir, IrBuilder, IrConfig, Presence, PrimitiveType, PrimitiveValue, Signal, Token,
};

use crate::wire::WireWriter;

/// Schema id used by the fixtures.
pub const SCHEMA_ID: i32 = 1;
/// Schema version of the car fixture.
pub const SCHEMA_VERSION: i32 = 1;
/// Template id of the car message.
pub const CAR_TEMPLATE_ID: i64 = 1;
/// Block length of the car message at version 0.
pub const CAR_BLOCK_LENGTH_V0: u16 = 47;
/// Block length of the car message at version 1.
pub const CAR_BLOCK_LENGTH_V1: u16 = 51;

fn value(text: &str, ty: Option<PrimitiveType>) -> PrimitiveValue {
    match PrimitiveValue::parse(text, ty) {
        Ok(v) => v,
        Err(err) => panic!("bad fixture value: {err}"),
    }
}

/// A required primitive at `offset`.
pub fn encoding(name: &str, ty: PrimitiveType, offset: i32) -> Token {
    array(name, ty, offset, 1)
}

/// A fixed-length array of `len` primitives at `offset`.
pub fn array(name: &str, ty: PrimitiveType, offset: i32, len: usize) -> Token {
    Token::builder(Signal::Encoding, name)
        .offset(offset)
        .encoded_length((ty.size() * len) as i32)
        .encoding(Encoding::of(ty))
        .build()
}

/// An optional primitive at `offset`.
pub fn optional(name: &str, ty: PrimitiveType, offset: i32) -> Token {
    Token::builder(Signal::Encoding, name)
        .offset(offset)
        .encoded_length(ty.size() as i32)
        .encoding(
            Encoding::builder()
                .primitive_type(ty)
                .presence(Presence::Optional)
                .build(),
        )
        .build()
}

/// A constant primitive; occupies no bytes.
pub fn constant(name: &str, ty: PrimitiveType, offset: i32, text: &str) -> Token {
    Token::builder(Signal::Encoding, name)
        .offset(offset)
        .encoded_length(0)
        .encoding(
            Encoding::builder()
                .primitive_type(ty)
                .presence(Presence::Constant)
                .const_value(value(text, Some(ty)))
                .build(),
        )
        .build()
}

/// A composite of `length` bytes at `offset` wrapping `members`.
pub fn composite(name: &str, offset: i32, length: i32, members: Vec<Token>) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(members.len() + 2);
    tokens.push(
        Token::builder(Signal::BeginComposite, name)
            .offset(offset)
            .encoded_length(length)
            .build(),
    );
    tokens.extend(members);
    tokens.push(
        Token::builder(Signal::EndComposite, name)
            .offset(offset)
            .encoded_length(length)
            .build(),
    );
    tokens
}

/// An enum of `ty` at `offset`; `values` are `(name, value text)` pairs.
pub fn enum_type(name: &str, ty: PrimitiveType, offset: i32, values: &[(&str, &str)]) -> Vec<Token> {
    let mut tokens = vec![
        Token::builder(Signal::BeginEnum, name)
            .offset(offset)
            .encoded_length(ty.size() as i32)
            .encoding(Encoding::of(ty))
            .build(),
    ];
    for (value_name, text) in values {
        tokens.push(
            Token::builder(Signal::ValidValue, *value_name)
                .encoded_length(ty.size() as i32)
                .encoding(
                    Encoding::builder()
                        .primitive_type(ty)
                        .const_value(value(text, Some(ty)))
                        .build(),
                )
                .build(),
        );
    }
    tokens.push(
        Token::builder(Signal::EndEnum, name)
            .offset(offset)
            .encoded_length(ty.size() as i32)
            .encoding(Encoding::of(ty))
            .build(),
    );
    tokens
}

/// A bitset of `ty` at `offset`; `choices` are `(name, bit position)` pairs.
pub fn set_type(name: &str, ty: PrimitiveType, offset: i32, choices: &[(&str, u64)]) -> Vec<Token> {
    let mut tokens = vec![
        Token::builder(Signal::BeginSet, name)
            .offset(offset)
            .encoded_length(ty.size() as i32)
            .encoding(Encoding::of(ty))
            .build(),
    ];
    for (choice, bit) in choices {
        tokens.push(
            Token::builder(Signal::Choice, *choice)
                .encoded_length(ty.size() as i32)
                .encoding(
                    Encoding::builder()
                        .primitive_type(ty)
                        .const_value(PrimitiveValue::UInt(*bit))
                        .build(),
                )
                .build(),
        );
    }
    tokens.push(
        Token::builder(Signal::EndSet, name)
            .offset(offset)
            .encoded_length(ty.size() as i32)
            .encoding(Encoding::of(ty))
            .build(),
    );
    tokens
}

/// Wrap type tokens in `BEGIN_FIELD`/`END_FIELD`. Offset, length,
/// presence and constant value are taken from the first type token.
pub fn field(name: &str, id: i32, type_tokens: Vec<Token>) -> Vec<Token> {
    let first = &type_tokens[0];
    let mut encoding = Encoding::builder().presence(first.encoding().presence());
    if let Some(value) = first.encoding().const_value() {
        encoding = encoding.const_value(value.clone());
    }
    let begin = Token::builder(Signal::BeginField, name)
        .id(id)
        .version(first.version())
        .offset(first.offset())
        .encoded_length(first.encoded_length())
        .encoding(encoding.build())
        .build();
    wrap_field(begin, type_tokens)
}

/// A CONSTANT field referring to one value (`Model.C`) of `enum_tokens`.
pub fn constant_enum_field(name: &str, id: i32, value_ref: &str, enum_tokens: Vec<Token>) -> Vec<Token> {
    let begin = Token::builder(Signal::BeginField, name)
        .id(id)
        .offset(enum_tokens[0].offset())
        .encoded_length(0)
        .encoding(
            Encoding::builder()
                .presence(Presence::Constant)
                .const_value(value(value_ref, None))
                .build(),
        )
        .build();
    wrap_field(begin, enum_tokens)
}

fn wrap_field(begin: Token, type_tokens: Vec<Token>) -> Vec<Token> {
    let end = Token::builder(Signal::EndField, begin.name())
        .id(begin.id())
        .version(begin.version())
        .offset(begin.offset())
        .encoded_length(begin.encoded_length())
        .encoding(begin.encoding().clone())
        .build();
    let mut tokens = Vec::with_capacity(type_tokens.len() + 2);
    tokens.push(begin);
    tokens.extend(type_tokens);
    tokens.push(end);
    tokens
}

/// Mark every token as introduced at `version`.
pub fn since(version: i32, tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|t| t.to_builder().version(version).build())
        .collect()
}

/// The `u16` dimension header used by every group.
pub fn group_size_encoding() -> Vec<Token> {
    composite(
        "groupSizeEncoding",
        0,
        4,
        vec![
            encoding("blockLength", PrimitiveType::Uint16, 0),
            encoding("numInGroup", PrimitiveType::Uint16, 2),
        ],
    )
}

/// A repeating group whose entries are `block_length` bytes, followed by
/// `body` (fields, then nested groups, then var data).
pub fn group(name: &str, id: i32, block_length: i32, body: Vec<Token>) -> Vec<Token> {
    let mut tokens = vec![
        Token::builder(Signal::BeginGroup, name)
            .id(id)
            .offset(Token::VARIABLE_LENGTH)
            .encoded_length(block_length)
            .build(),
    ];
    tokens.extend(group_size_encoding());
    tokens.extend(body);
    tokens.push(
        Token::builder(Signal::EndGroup, name)
            .id(id)
            .offset(Token::VARIABLE_LENGTH)
            .encoded_length(block_length)
            .build(),
    );
    tokens
}

/// Variable-length data with a `u16` length prefix.
pub fn var_data(name: &str, id: i32, character_encoding: Option<&str>) -> Vec<Token> {
    let mut data = Encoding::builder().primitive_type(PrimitiveType::Uint8);
    if let Some(character_encoding) = character_encoding {
        data = data.character_encoding(character_encoding);
    }
    let mut tokens = vec![
        Token::builder(Signal::BeginVarData, name)
            .id(id)
            .offset(Token::VARIABLE_LENGTH)
            .encoded_length(Token::VARIABLE_LENGTH)
            .build(),
    ];
    tokens.extend(composite(
        "varDataEncoding",
        0,
        Token::VARIABLE_LENGTH,
        vec![
            encoding("length", PrimitiveType::Uint16, 0),
            Token::builder(Signal::Encoding, "varData")
                .offset(2)
                .encoded_length(Token::VARIABLE_LENGTH)
                .encoding(data.build())
                .build(),
        ],
    ));
    tokens.push(
        Token::builder(Signal::EndVarData, name)
            .id(id)
            .offset(Token::VARIABLE_LENGTH)
            .encoded_length(Token::VARIABLE_LENGTH)
            .build(),
    );
    tokens
}

/// Frame `body` as message `id` with the given root block length.
pub fn message(name: &str, id: i32, block_length: i32, body: Vec<Token>) -> Vec<Token> {
    let mut tokens = vec![
        Token::builder(Signal::BeginMessage, name)
            .id(id)
            .encoded_length(block_length)
            .build(),
    ];
    tokens.extend(body);
    tokens.push(
        Token::builder(Signal::EndMessage, name)
            .id(id)
            .encoded_length(block_length)
            .build(),
    );
    tokens
}

/// The 8-byte message header: `blockLength`, `templateId`, `schemaId`,
/// `version`, all `u16`.
pub fn header_tokens() -> Vec<Token> {
    composite(
        "messageHeader",
        0,
        8,
        vec![
            encoding("blockLength", PrimitiveType::Uint16, 0),
            encoding("templateId", PrimitiveType::Uint16, 2),
            encoding("schemaId", PrimitiveType::Uint16, 4),
            encoding("version", PrimitiveType::Uint16, 6),
        ],
    )
}

/// The `Model` enum, a char enum with values `A`, `B`, `C`.
pub fn model_enum(offset: i32) -> Vec<Token> {
    enum_type(
        "Model",
        PrimitiveType::Char,
        offset,
        &[("A", "A"), ("B", "B"), ("C", "C")],
    )
}

/// The car message.
///
/// Root block (51 bytes at version 1, 47 at version 0):
///
/// | offset | field           | type                          |
/// |--------|-----------------|-------------------------------|
/// | 0      | serialNumber    | uint64                        |
/// | 8      | modelYear       | uint16                        |
/// | 10     | available       | BooleanType enum (uint8)      |
/// | 11     | code            | Model enum (char)             |
/// | 12     | someNumbers     | uint32\[5\]                   |
/// | 32     | vehicleCode     | char\[6\]                     |
/// | 38     | extras          | OptionalExtras set (uint8)    |
/// | 39     | discountedModel | constant `Model.C`            |
/// | 39     | engine          | Engine composite (8 bytes)    |
/// | 47     | fuelRating      | optional int32, since v1      |
///
/// Then groups `fuelFigures` (with `usageDescription` var data) and
/// `performanceFigures` (with nested `acceleration`), then var data `make`,
/// `model` and `activationCode` (since v1).
pub fn car_message() -> Vec<Token> {
    let mut body = Vec::new();
    body.extend(field(
        "serialNumber",
        1,
        vec![encoding("uint64", PrimitiveType::Uint64, 0)],
    ));
    body.extend(field(
        "modelYear",
        2,
        vec![encoding("ModelYear", PrimitiveType::Uint16, 8)],
    ));
    body.extend(field(
        "available",
        3,
        enum_type("BooleanType", PrimitiveType::Uint8, 10, &[("F", "0"), ("T", "1")]),
    ));
    body.extend(field("code", 4, model_enum(11)));
    body.extend(field(
        "someNumbers",
        5,
        vec![array("someNumbers", PrimitiveType::Uint32, 12, 5)],
    ));
    body.extend(field(
        "vehicleCode",
        6,
        vec![array("VehicleCode", PrimitiveType::Char, 32, 6)],
    ));
    body.extend(field(
        "extras",
        7,
        set_type(
            "OptionalExtras",
            PrimitiveType::Uint8,
            38,
            &[("sunRoof", 0), ("sportsPack", 1), ("cruiseControl", 2)],
        ),
    ));
    body.extend(constant_enum_field("discountedModel", 8, "Model.C", model_enum(39)));

    let mut engine = vec![
        encoding("capacity", PrimitiveType::Uint16, 0),
        encoding("numCylinders", PrimitiveType::Uint8, 2),
        constant("maxRpm", PrimitiveType::Uint16, 3, "9000"),
        array("manufacturerCode", PrimitiveType::Char, 3, 3),
        constant("fuel", PrimitiveType::Char, 6, "Petrol"),
    ];
    let mut booster = enum_type(
        "BoostType",
        PrimitiveType::Char,
        0,
        &[("TURBO", "T"), ("SUPERCHARGER", "S"), ("NITROUS", "N"), ("KERS", "K")],
    );
    booster.push(encoding("horsePower", PrimitiveType::Uint8, 1));
    engine.extend(composite("Booster", 6, 2, booster));
    body.extend(field("engine", 9, composite("Engine", 39, 8, engine)));

    body.extend(since(
        1,
        field(
            "fuelRating",
            10,
            vec![optional("FuelRating", PrimitiveType::Int32, 47)],
        ),
    ));

    let mut fuel_figures = Vec::new();
    fuel_figures.extend(field("speed", 12, vec![encoding("uint16", PrimitiveType::Uint16, 0)]));
    fuel_figures.extend(field("mpg", 13, vec![encoding("float", PrimitiveType::Float, 2)]));
    fuel_figures.extend(var_data("usageDescription", 14, Some("UTF-8")));
    body.extend(group("fuelFigures", 11, 6, fuel_figures));

    let mut acceleration = Vec::new();
    acceleration.extend(field("mph", 18, vec![encoding("uint16", PrimitiveType::Uint16, 0)]));
    acceleration.extend(field("seconds", 19, vec![encoding("float", PrimitiveType::Float, 2)]));
    let mut performance = Vec::new();
    performance.extend(field(
        "octaneRating",
        16,
        vec![encoding("Octane", PrimitiveType::Uint8, 0)],
    ));
    performance.extend(group("acceleration", 17, 6, acceleration));
    body.extend(group("performanceFigures", 15, 1, performance));

    body.extend(var_data("make", 20, Some("UTF-8")));
    body.extend(var_data("model", 21, Some("UTF-8")));
    body.extend(since(1, var_data("activationCode", 22, Some("UTF-8"))));

    message("Car", CAR_TEMPLATE_ID as i32, CAR_BLOCK_LENGTH_V1 as i32, body)
}

/// A builder preloaded with the fixture header and schema metadata.
pub fn builder(config: IrConfig) -> IrBuilder {
    IrBuilder::new("baseline", header_tokens())
        .config(config)
        .namespace_name("sbe.baseline")
        .schema_id(SCHEMA_ID)
        .version(SCHEMA_VERSION)
        .semantic_version("5.2")
}

/// An [`Ir`] holding only the car message.
pub fn car_ir() -> Ir {
    let mut builder = builder(IrConfig::default());
    if let Err(err) = builder.add_message(CAR_TEMPLATE_ID, car_message()) {
        panic!("car fixture rejected: {err}");
    }
    match builder.build() {
        Ok(ir) => ir,
        Err(err) => panic!("car fixture rejected: {err}"),
    }
}

/// `(speed, mpg, usageDescription)` of the car's fuel figures.
pub const FUEL_FIGURES: [(u16, f32, &str); 3] = [
    (30, 35.9, "Urban Cycle"),
    (55, 49.0, "Combined Cycle"),
    (75, 40.0, "Highway Cycle"),
];

/// `(octaneRating, [(mph, seconds)])` of the car's performance figures.
pub const PERFORMANCE_FIGURES: [(u8, [(u16, f32); 3]); 2] = [
    (95, [(30, 4.0), (60, 7.5), (100, 12.2)]),
    (99, [(30, 3.8), (60, 7.1), (100, 11.8)]),
];

/// A car message with header, as produced by a version `version` encoder.
///
/// Root values: serialNumber 1234, modelYear 2013, available T, code A,
/// someNumbers 0..5, vehicleCode `abcdef`, extras sportsPack|cruiseControl,
/// engine capacity 2000 / 4 cylinders / `123` / NITROUS 200hp, fuelRating 7
/// (v1 only). Var data: `Honda`, `Civic VTi`, `deadbeef` (v1 only).
pub fn car_buffer(version: u16) -> Vec<u8> {
    let block_length = if version >= 1 {
        CAR_BLOCK_LENGTH_V1
    } else {
        CAR_BLOCK_LENGTH_V0
    };
    let mut w = WireWriter::new();
    w.header(block_length, CAR_TEMPLATE_ID as u16, SCHEMA_ID as u16, version);

    w.u64(1234).u16(2013).u8(1).u8(b'A');
    for n in 0..5 {
        w.u32(n);
    }
    w.bytes(b"abcdef").u8(0b110);
    w.u16(2000).u8(4).bytes(b"123").u8(b'N').u8(200);
    if version >= 1 {
        w.i32(7);
    }

    w.group_header(6, FUEL_FIGURES.len() as u16);
    for (speed, mpg, description) in FUEL_FIGURES {
        w.u16(speed).f32(mpg).var_data(description.as_bytes());
    }

    w.group_header(1, PERFORMANCE_FIGURES.len() as u16);
    for (octane, accelerations) in PERFORMANCE_FIGURES {
        w.u8(octane).group_header(6, accelerations.len() as u16);
        for (mph, seconds) in accelerations {
            w.u16(mph).f32(seconds);
        }
    }

    w.var_data(b"Honda").var_data(b"Civic VTi");
    if version >= 1 {
        w.var_data(b"deadbeef");
    }
    w.finish()
}
