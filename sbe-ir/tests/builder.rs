use sbe_ir::{
    DuplicateTypePolicy, Encoding, Ir, IrBuilder, IrConfig, IrError, Presence, PrimitiveType,
    Signal, Token, count_component_tokens, util,
};
use sbe_testhelpers::fixtures::{
    CAR_TEMPLATE_ID, builder, car_ir, car_message, composite, constant_enum_field, encoding,
    enum_type, field, header_tokens, message, model_enum,
};
use sbe_testhelpers::setup;

static_assertions::assert_impl_all!(Ir: Send, Sync);

fn position(tokens: &[Token], signal: Signal, name: &str) -> usize {
    tokens
        .iter()
        .position(|t| t.signal() == signal && t.name() == name)
        .unwrap_or_else(|| panic!("no {signal} '{name}'"))
}

#[test]
fn every_pair_records_its_span() {
    setup();
    let ir = car_ir();
    let tokens = ir.message(CAR_TEMPLATE_ID).unwrap();

    assert_eq!(tokens[0].component_token_count(), tokens.len());
    assert_eq!(tokens.last().unwrap().component_token_count(), tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        match token.signal().begins() {
            Some(component) => {
                let end = &tokens[i + token.component_token_count() - 1];
                assert_eq!(end.signal(), component.end(), "span of {}", token.name());
                assert_eq!(end.name(), token.name());
                assert_eq!(end.component_token_count(), token.component_token_count());
            }
            None if token.signal().ends().is_none() => {
                assert_eq!(token.component_token_count(), 1, "{}", token.name());
            }
            None => {}
        }
    }

    // group, dimensions (4), two fields (3 each), var data (6), end
    let fuel_figures = position(tokens, Signal::BeginGroup, "fuelFigures");
    assert_eq!(tokens[fuel_figures].component_token_count(), 18);
}

#[test]
fn span_computation_is_idempotent() {
    setup();
    let ir = car_ir();
    let processed = ir.message(CAR_TEMPLATE_ID).unwrap();

    let mut again = processed.to_vec();
    count_component_tokens(&mut again).unwrap();
    assert_eq!(again.as_slice(), processed);

    let mut builder = builder(IrConfig::default());
    builder.add_message(CAR_TEMPLATE_ID, processed.to_vec()).unwrap();
    let rebuilt = builder.build().unwrap();
    assert_eq!(rebuilt.message(CAR_TEMPLATE_ID), Some(processed));
}

#[test]
fn constant_enum_field_keeps_only_its_value() {
    setup();
    let ir = car_ir();
    let tokens = ir.message(CAR_TEMPLATE_ID).unwrap();

    let i = position(tokens, Signal::BeginField, "discountedModel");
    let signals: Vec<_> = tokens[i..i + 5].iter().map(Token::signal).collect();
    assert_eq!(
        signals,
        [
            Signal::BeginField,
            Signal::BeginEnum,
            Signal::ValidValue,
            Signal::EndEnum,
            Signal::EndField,
        ]
    );
    assert_eq!(tokens[i].component_token_count(), 5);
    assert_eq!(tokens[i + 1].encoded_length(), 0);
    assert_eq!(tokens[i + 2].name(), "C");
    assert_eq!(tokens[i + 2].encoded_length(), 0);
    assert_eq!(tokens[i + 2].encoding().presence(), Presence::Constant);

    // the same enum used by a non-constant field is untouched
    let code = position(tokens, Signal::BeginField, "code");
    assert_eq!(tokens[code + 1].component_token_count(), 5);
    assert_eq!(tokens[code + 1].encoded_length(), 1);
}

#[test]
fn constant_encodings_have_no_length() {
    setup();
    let ir = car_ir();
    let tokens = ir.message(CAR_TEMPLATE_ID).unwrap();
    for name in ["maxRpm", "fuel"] {
        let token = &tokens[position(tokens, Signal::Encoding, name)];
        assert!(token.is_constant_encoding());
        assert_eq!(token.encoded_length(), 0);
    }
}

#[test]
fn types_are_captured_by_name() {
    setup();
    let ir = car_ir();

    let names: Vec<_> = ir.types().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        [
            "BooleanType",
            "Model",
            "OptionalExtras",
            "Engine",
            "Booster",
            "BoostType",
            "groupSizeEncoding",
            "varDataEncoding",
        ]
    );

    let model = ir.type_by_name("Model").unwrap();
    assert_eq!(model.len(), 5);
    assert_eq!(model[0].offset(), 11, "first definition is kept");
    assert_eq!(model[0].component_token_count(), 5);

    assert_eq!(ir.type_by_name("Engine").unwrap().len(), 16);
    assert_eq!(ir.type_by_name("Booster").unwrap().len(), 9);
    assert_eq!(ir.type_by_name("BoostType").unwrap().len(), 6);
    assert_eq!(ir.type_by_name("NoSuchType"), None);
}

fn other_model_message() -> Vec<Token> {
    message(
        "Other",
        2,
        1,
        field(
            "other",
            1,
            enum_type("Model", PrimitiveType::Char, 0, &[("X", "X"), ("Y", "Y")]),
        ),
    )
}

#[test]
fn conflicting_type_last_wins_by_default() {
    setup();
    let mut builder = builder(IrConfig::default());
    builder.add_message(CAR_TEMPLATE_ID, car_message()).unwrap();
    builder.add_message(2, other_model_message()).unwrap();
    let ir = builder.build().unwrap();

    let model = ir.type_by_name("Model").unwrap();
    let values: Vec<_> = model
        .iter()
        .filter(|t| t.signal() == Signal::ValidValue)
        .map(Token::name)
        .collect();
    assert_eq!(values, ["X", "Y"]);
}

#[test]
fn conflicting_type_can_be_rejected() {
    setup();
    let config = IrConfig {
        duplicate_types: DuplicateTypePolicy::Reject,
        ..IrConfig::default()
    };
    let mut builder = builder(config);
    builder.add_message(CAR_TEMPLATE_ID, car_message()).unwrap();

    let err = builder.add_message(2, other_model_message()).unwrap_err();
    assert_eq!(
        err,
        IrError::ConflictingType {
            name: "Model".to_string()
        }
    );

    let ir = builder.build().unwrap();
    assert!(ir.message(2).is_none());
    assert_eq!(ir.type_by_name("Model").unwrap().len(), 5);
}

#[test]
fn unknown_constant_value_fails_the_build() {
    setup();
    let mut builder = builder(IrConfig::default());
    let tokens = message(
        "Bad",
        3,
        0,
        constant_enum_field("discountedModel", 1, "Model.Z", model_enum(0)),
    );
    assert_eq!(
        builder.add_message(3, tokens).unwrap_err(),
        IrError::UnknownConstantValue {
            field: "discountedModel".to_string(),
            value: "Model.Z".to_string(),
        }
    );
}

#[test]
fn malformed_token_lists() {
    setup();
    let mut builder = builder(IrConfig::default());

    assert_eq!(
        builder.add_message(5, Vec::new()).unwrap_err(),
        IrError::EmptyMessage { message_id: 5 }
    );

    let err = builder
        .add_message(5, field("f", 1, vec![encoding("e", PrimitiveType::Uint8, 0)]))
        .unwrap_err();
    assert_eq!(
        err,
        IrError::NotAMessage {
            message_id: 5,
            first: Signal::BeginField,
            last: Signal::EndField,
        }
    );

    let err = builder
        .add_message(5, message("Bad", 5, 0, vec![Token::builder(Signal::EndField, "f").build()]))
        .unwrap_err();
    assert_eq!(
        err,
        IrError::UnmatchedEnd {
            signal: Signal::EndField,
            name: "f".to_string(),
            index: 1,
        }
    );

    let err = builder
        .add_message(
            5,
            message("Bad", 5, 0, vec![Token::builder(Signal::BeginComposite, "c").build()]),
        )
        .unwrap_err();
    assert_eq!(
        err,
        IrError::MissingEnd {
            signal: Signal::EndComposite,
            name: "c".to_string(),
            index: 1,
        }
    );

    let no_value = Token::builder(Signal::Encoding, "x")
        .encoding(
            Encoding::builder()
                .primitive_type(PrimitiveType::Uint8)
                .presence(Presence::Constant)
                .build(),
        )
        .build();
    let err = builder
        .add_message(5, message("Bad", 5, 0, field("f", 1, vec![no_value])))
        .unwrap_err();
    assert!(
        matches!(err, IrError::MissingConstantValue { ref name, index: 1 } if name == "f"),
        "{err}"
    );

    // nothing above was registered
    assert!(builder.build().unwrap().messages().next().is_none());
}

#[test]
fn header_structure_locates_its_fields() {
    setup();
    let ir = car_ir();
    let header = ir.header_structure();
    assert_eq!(header.encoded_length(), 8);
    assert_eq!(header.tokens()[0].component_token_count(), 6);
    assert_eq!(header.block_length().offset(), 0);
    assert_eq!(header.template_id().offset(), 2);
    assert_eq!(header.schema_id().offset(), 4);
    assert_eq!(header.schema_version().offset(), 6);

    let partial = composite(
        "messageHeader",
        0,
        2,
        vec![encoding("blockLength", PrimitiveType::Uint16, 0)],
    );
    assert_eq!(
        IrBuilder::new("p", partial).build().unwrap_err(),
        IrError::MissingHeaderField { name: "templateId" }
    );
}

#[test]
fn namespaces() {
    setup();
    let ir = builder(IrConfig::default()).build().unwrap();
    assert_eq!(ir.applicable_namespace(), "sbe.baseline");
    assert_eq!(ir.namespaces(), ["sbe", "baseline"]);

    let collapsed = builder(IrConfig {
        collapse_namespaces: true,
        ..IrConfig::default()
    })
    .build()
    .unwrap();
    assert_eq!(collapsed.namespaces(), ["sbe_baseline"]);

    let unnamed = IrBuilder::new("uk.co.real_logic", header_tokens()).build().unwrap();
    assert_eq!(unnamed.namespace_name(), None);
    assert_eq!(unnamed.applicable_namespace(), "uk.co.real_logic");
    assert_eq!(unnamed.namespaces(), ["uk", "co", "real_logic"]);
}

#[test]
fn body_splits_into_fields_groups_and_var_data() {
    setup();
    let ir = car_ir();
    let tokens = ir.message(CAR_TEMPLATE_ID).unwrap();
    let body = util::message_body(tokens);

    let mut fields = Vec::new();
    let groups_at = util::collect_fields(body, 0, &mut fields);
    assert_eq!(fields.len(), groups_at);
    let field_names: Vec<_> = fields
        .iter()
        .filter(|t| t.signal() == Signal::BeginField)
        .map(|t| t.name())
        .collect();
    assert_eq!(
        field_names,
        [
            "serialNumber",
            "modelYear",
            "available",
            "code",
            "someNumbers",
            "vehicleCode",
            "extras",
            "discountedModel",
            "engine",
            "fuelRating",
        ]
    );

    let mut groups = Vec::new();
    let var_data_at = util::collect_groups(body, groups_at, &mut groups);
    assert_eq!(groups[0].name(), "fuelFigures");
    assert_eq!(body[var_data_at].name(), "make");

    let mut var_data = Vec::new();
    assert_eq!(util::collect_var_data(body, var_data_at, &mut var_data), body.len());
    assert_eq!(var_data.len(), 18);

    let end = util::find_end_signal(tokens, 0, Signal::EndGroup, "fuelFigures");
    assert_eq!(end, position(tokens, Signal::EndGroup, "fuelFigures"));
    assert_eq!(
        util::find_end_signal(tokens, 0, Signal::EndGroup, "missing"),
        tokens.len() - 1
    );
}
