use sbe_ir::{Ir, IrConfig, PrimitiveType, PrimitiveValue, Token};
use sbe_otf::{
    FieldValue, HeaderDecoder, MessageHeader, OtfError, PrintingListener, TokenListener, decode,
};
use sbe_testhelpers::fixtures::{
    CAR_BLOCK_LENGTH_V1, CAR_TEMPLATE_ID, builder, car_buffer, car_ir,
    constant, constant_enum_field, encoding, enum_type, field, message, model_enum, optional,
    set_type, since, var_data,
};
use sbe_testhelpers::setup;
use sbe_testhelpers::wire::WireWriter;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    BeginMessage(String),
    EndMessage(String),
    Encoding(String, FieldValue),
    Enum(String, FieldValue, Option<String>),
    BitSet(String, FieldValue),
    BeginComposite(String),
    EndComposite(String),
    GroupHeader(String, u64),
    BeginGroup(String, u64, u64),
    EndGroup(String, u64, u64),
    VarData(String, Vec<u8>),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl TokenListener for Recorder {
    fn on_begin_message(&mut self, token: &Token) {
        self.events.push(Event::BeginMessage(token.name().to_string()));
    }

    fn on_end_message(&mut self, token: &Token) {
        self.events.push(Event::EndMessage(token.name().to_string()));
    }

    fn on_encoding(&mut self, field: &Token, type_token: &Token, value: &FieldValue) {
        let name = if field.name() == type_token.name() {
            field.name().to_string()
        } else {
            format!("{}/{}", field.name(), type_token.name())
        };
        self.events.push(Event::Encoding(name, value.clone()));
    }

    fn on_enum(&mut self, field: &Token, _tokens: &[Token], value: &FieldValue, matched: Option<&Token>) {
        self.events.push(Event::Enum(
            field.name().to_string(),
            value.clone(),
            matched.map(|t| t.name().to_string()),
        ));
    }

    fn on_bit_set(&mut self, field: &Token, _tokens: &[Token], value: &FieldValue) {
        self.events
            .push(Event::BitSet(field.name().to_string(), value.clone()));
    }

    fn on_begin_composite(&mut self, _field: &Token, tokens: &[Token]) {
        self.events
            .push(Event::BeginComposite(tokens[0].name().to_string()));
    }

    fn on_end_composite(&mut self, _field: &Token, tokens: &[Token]) {
        self.events
            .push(Event::EndComposite(tokens[0].name().to_string()));
    }

    fn on_group_header(&mut self, token: &Token, num_in_group: u64) {
        self.events
            .push(Event::GroupHeader(token.name().to_string(), num_in_group));
    }

    fn on_begin_group(&mut self, token: &Token, group_index: u64, num_in_group: u64) {
        self.events.push(Event::BeginGroup(
            token.name().to_string(),
            group_index,
            num_in_group,
        ));
    }

    fn on_end_group(&mut self, token: &Token, group_index: u64, num_in_group: u64) {
        self.events.push(Event::EndGroup(
            token.name().to_string(),
            group_index,
            num_in_group,
        ));
    }

    fn on_var_data(&mut self, field: &Token, data: &[u8], _type_token: &Token) {
        self.events
            .push(Event::VarData(field.name().to_string(), data.to_vec()));
    }
}

/// Listens to nothing.
struct Silent;

impl TokenListener for Silent {}

fn single_message_ir(name: &str, id: i32, block_length: i32, body: Vec<Token>) -> Ir {
    let mut builder = builder(IrConfig::default());
    builder
        .add_message(i64::from(id), message(name, id, block_length, body))
        .unwrap();
    builder.build().unwrap()
}

/// `required` int32 at 0, `optional` int32 at 4 since version 1, then
/// UTF-8 var data.
fn versioned_ir() -> Ir {
    let mut body = Vec::new();
    body.extend(field(
        "required",
        1,
        vec![encoding("required", PrimitiveType::Int32, 0)],
    ));
    body.extend(since(
        1,
        field("optional", 2, vec![optional("optional", PrimitiveType::Int32, 4)]),
    ));
    body.extend(var_data("data", 3, Some("UTF-8")));
    single_message_ir("Versioned", 7, 8, body)
}

fn int(v: i64) -> FieldValue {
    FieldValue::Present(vec![PrimitiveValue::Int(v)])
}

#[test]
fn older_producer_leaves_newer_field_not_present() {
    setup();
    let ir = versioned_ir();
    let tokens = ir.message(7).unwrap();
    let buf = WireWriter::new().i32(1234).var_data(b"abcdef").finish();

    let mut recorder = Recorder::default();
    let end = decode(&buf, 0, 0, 4, tokens, &mut recorder).unwrap();

    assert_eq!(end, buf.len());
    assert_eq!(
        recorder.events,
        [
            Event::BeginMessage("Versioned".to_string()),
            Event::Encoding("required".to_string(), int(1234)),
            Event::Encoding(
                "optional".to_string(),
                FieldValue::NotPresent(PrimitiveValue::Int(i32::MIN as i64))
            ),
            Event::VarData("data".to_string(), b"abcdef".to_vec()),
            Event::EndMessage("Versioned".to_string()),
        ]
    );
}

#[test]
fn current_producer_reads_every_field() {
    setup();
    let ir = versioned_ir();
    let tokens = ir.message(7).unwrap();
    let buf = WireWriter::new()
        .i32(1234)
        .i32(-5)
        .var_data(b"abcdef")
        .finish();

    let mut recorder = Recorder::default();
    assert_eq!(decode(&buf, 0, 1, 8, tokens, &mut recorder).unwrap(), buf.len());
    assert_eq!(recorder.events[2], Event::Encoding("optional".to_string(), int(-5)));
}

#[test]
fn newer_producer_block_is_skipped_by_acting_block_length() {
    setup();
    let ir = versioned_ir();
    let tokens = ir.message(7).unwrap();
    let buf = WireWriter::new()
        .zeros(3)
        .i32(1234)
        .i32(-5)
        .u32(0xdead_beef)
        .var_data(b"abcdef")
        .finish();

    let mut recorder = Recorder::default();
    let end = decode(&buf, 3, 2, 12, tokens, &mut recorder).unwrap();
    assert_eq!(end, buf.len());
    assert_eq!(recorder.events[1], Event::Encoding("required".to_string(), int(1234)));
    assert_eq!(
        recorder.events[3],
        Event::VarData("data".to_string(), b"abcdef".to_vec())
    );
}

#[test]
fn enums_and_bitsets() {
    setup();
    let mut body = Vec::new();
    body.extend(field(
        "flag",
        1,
        enum_type("BooleanType", PrimitiveType::Uint8, 0, &[("F", "0"), ("T", "1")]),
    ));
    body.extend(field(
        "options",
        2,
        set_type("Options", PrimitiveType::Uint8, 1, &[("a", 0), ("b", 1), ("c", 2)]),
    ));
    body.extend(field(
        "grade",
        3,
        enum_type("Grade", PrimitiveType::Char, 2, &[("A", "A"), ("B", "B")]),
    ));
    let ir = single_message_ir("Flags", 2, 3, body);
    let buf = [7, 0b011, b'B'];

    let mut recorder = Recorder::default();
    decode(&buf, 0, 0, 3, ir.message(2).unwrap(), &mut recorder).unwrap();
    assert_eq!(
        recorder.events[1..4],
        [
            Event::Enum(
                "flag".to_string(),
                FieldValue::Present(vec![PrimitiveValue::UInt(7)]),
                None
            ),
            Event::BitSet(
                "options".to_string(),
                FieldValue::Present(vec![PrimitiveValue::UInt(0b011)])
            ),
            Event::Enum(
                "grade".to_string(),
                FieldValue::Present(vec![PrimitiveValue::UInt(b'B' as u64)]),
                Some("B".to_string())
            ),
        ]
    );

    let mut printer = PrintingListener::new();
    decode(&buf, 0, 0, 3, ir.message(2).unwrap(), &mut printer).unwrap();
    assert_eq!(
        printer.output(),
        "Flags.flag=null\nFlags.options: a=true b=true c=false\nFlags.grade=B\n"
    );
}

#[test]
fn constants_read_no_bytes() {
    setup();
    let mut body = Vec::new();
    body.extend(field(
        "maxRpm",
        1,
        vec![constant("maxRpm", PrimitiveType::Uint16, 0, "9000")],
    ));
    body.extend(constant_enum_field("discountedModel", 2, "Model.C", model_enum(0)));
    let ir = single_message_ir("Constants", 3, 0, body);

    let mut recorder = Recorder::default();
    let end = decode(&[], 0, 0, 0, ir.message(3).unwrap(), &mut recorder).unwrap();
    assert_eq!(end, 0);
    assert_eq!(
        recorder.events[1..3],
        [
            Event::Encoding(
                "maxRpm".to_string(),
                FieldValue::Constant(PrimitiveValue::UInt(9000))
            ),
            Event::Enum(
                "discountedModel".to_string(),
                FieldValue::Constant(PrimitiveValue::UInt(b'C' as u64)),
                Some("C".to_string())
            ),
        ]
    );
}

#[test]
fn header_fields() {
    setup();
    let ir = car_ir();
    let header = HeaderDecoder::new(ir.header_structure());
    let buf = car_buffer(1);

    assert_eq!(header.encoded_length(), 8);
    assert_eq!(
        header.decode(&buf, 0).unwrap(),
        MessageHeader {
            block_length: CAR_BLOCK_LENGTH_V1 as usize,
            template_id: CAR_TEMPLATE_ID,
            schema_id: 1,
            version: 1,
        }
    );
    assert!(header.decode(&buf[..7], 0).is_err());
}

fn decode_car(buf: &[u8], listener: &mut dyn TokenListener) -> Result<usize, OtfError> {
    let ir = car_ir();
    let header = HeaderDecoder::new(ir.header_structure());
    let h = header.decode(buf, 0)?;
    let tokens = ir.message(h.template_id).unwrap();
    decode(
        buf,
        header.encoded_length(),
        h.version,
        h.block_length,
        tokens,
        listener,
    )
}

#[test]
fn car_groups_and_cursor() {
    setup();
    let buf = car_buffer(1);
    let mut recorder = Recorder::default();
    assert_eq!(decode_car(&buf, &mut recorder).unwrap(), buf.len());

    let headers: Vec<_> = recorder
        .events
        .iter()
        .filter_map(|e| match e {
            Event::GroupHeader(name, n) => Some((name.as_str(), *n)),
            _ => None,
        })
        .collect();
    assert_eq!(
        headers,
        [
            ("fuelFigures", 3),
            ("performanceFigures", 2),
            ("acceleration", 3),
            ("acceleration", 3),
        ]
    );

    let entries = recorder
        .events
        .iter()
        .filter(|e| matches!(e, Event::BeginGroup(..)))
        .count();
    let ends = recorder
        .events
        .iter()
        .filter(|e| matches!(e, Event::EndGroup(..)))
        .count();
    assert_eq!((entries, ends), (11, 11));

    let var_data: Vec<_> = recorder
        .events
        .iter()
        .filter_map(|e| match e {
            Event::VarData(name, data) => Some((name.as_str(), data.as_slice())),
            _ => None,
        })
        .collect();
    assert_eq!(var_data[0], ("usageDescription", b"Urban Cycle".as_slice()));
    assert_eq!(
        var_data[3..],
        [
            ("make", b"Honda".as_slice()),
            ("model", b"Civic VTi".as_slice()),
            ("activationCode", b"deadbeef".as_slice()),
        ]
    );
}

#[test]
fn car_composite_members() {
    setup();
    let buf = car_buffer(1);
    let mut recorder = Recorder::default();
    decode_car(&buf, &mut recorder).unwrap();

    let begin = recorder
        .events
        .iter()
        .position(|e| *e == Event::BeginComposite("Engine".to_string()))
        .unwrap();
    assert_eq!(
        recorder.events[begin..begin + 11],
        [
            Event::BeginComposite("Engine".to_string()),
            Event::Encoding("engine/capacity".to_string(), FieldValue::Present(vec![PrimitiveValue::UInt(2000)])),
            Event::Encoding("engine/numCylinders".to_string(), FieldValue::Present(vec![PrimitiveValue::UInt(4)])),
            Event::Encoding("engine/maxRpm".to_string(), FieldValue::Constant(PrimitiveValue::UInt(9000))),
            Event::Encoding(
                "engine/manufacturerCode".to_string(),
                FieldValue::Present(vec![PrimitiveValue::Bytes(b"123".to_vec())])
            ),
            Event::Encoding(
                "engine/fuel".to_string(),
                FieldValue::Constant(PrimitiveValue::Bytes(b"Petrol".to_vec()))
            ),
            Event::BeginComposite("Booster".to_string()),
            Event::Enum(
                "engine".to_string(),
                FieldValue::Present(vec![PrimitiveValue::UInt(b'N' as u64)]),
                Some("NITROUS".to_string())
            ),
            Event::Encoding("engine/horsePower".to_string(), FieldValue::Present(vec![PrimitiveValue::UInt(200)])),
            Event::EndComposite("Booster".to_string()),
            Event::EndComposite("Engine".to_string()),
        ]
    );
}

#[test]
fn version_zero_car() {
    setup();
    let buf = car_buffer(0);
    let mut recorder = Recorder::default();
    assert_eq!(decode_car(&buf, &mut recorder).unwrap(), buf.len());

    assert!(recorder.events.contains(&Event::Encoding(
        "fuelRating/FuelRating".to_string(),
        FieldValue::NotPresent(PrimitiveValue::Int(i32::MIN as i64)),
    )));
    assert!(
        recorder
            .events
            .contains(&Event::VarData("activationCode".to_string(), Vec::new()))
    );
}

#[test]
fn truncated_buffers_report_the_scope() {
    setup();
    let buf = car_buffer(1);
    assert_eq!(buf.len(), 203);

    let err = decode_car(&buf[..28], &mut Silent).unwrap_err();
    assert_eq!(
        err,
        OtfError::InScope {
            path: "Car".to_string(),
            source: Box::new(OtfError::OutOfBounds {
                index: 28,
                width: 4,
                len: 28
            }),
        }
    );

    let err = decode_car(&buf[..140], &mut Silent).unwrap_err();
    assert_eq!(
        err,
        OtfError::InScope {
            path: "Car.performanceFigures".to_string(),
            source: Box::new(OtfError::OutOfBounds {
                index: 134,
                width: 18,
                len: 140
            }),
        }
    );

    let err = decode_car(&buf[..buf.len() - 1], &mut Silent).unwrap_err();
    assert!(err.to_string().starts_with("Car: "), "{err}");
}

#[test]
fn tokens_must_form_a_message() {
    setup();
    let tokens = field("f", 1, vec![encoding("f", PrimitiveType::Uint8, 0)]);
    let err = decode(&[0], 0, 0, 1, &tokens, &mut Silent).unwrap_err();
    assert!(
        matches!(
            err,
            OtfError::InScope { ref path, ref source }
                if path.is_empty() && matches!(**source, OtfError::UnexpectedLayout { .. })
        ),
        "{err}"
    );
}
