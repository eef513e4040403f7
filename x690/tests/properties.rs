//! Universal codec properties: round-trips, idempotence, tag discipline,
//! constraint closure and resumable underruns.

use hex_literal::hex;
use x690::asn1::{
    BitString, Boolean, CharacterString, Choice, GeneralizedTime, Integer, Null,
    ObjectIdentifier, OctetString, Real, Sequence, SequenceOf, SetOf, UtcTime, Value,
};
use x690::{ber, cer, der, Constraint, ErrorKind, NamedType, NamedTypes, Tag};

fn sample_values() -> Vec<Value> {
    vec![
        Value::Boolean(Boolean::new(true)),
        Value::Integer(Integer::new(0)),
        Value::Integer(Integer::new(-32768)),
        Value::Integer(Integer::new(1_000_000_007)),
        Value::BitString(BitString::from_text("'101011'B").unwrap()),
        Value::OctetString(OctetString::from("quick brown")),
        Value::Null(Null::new()),
        Value::ObjectIdentifier("1.3.6.1.4.1.11".parse().unwrap()),
        Value::Real(Real::from_f64(0.75)),
        Value::CharacterString(CharacterString::printable().with_value("Test User 1").unwrap()),
        Value::CharacterString(CharacterString::utf8().with_value("héllo wörld").unwrap()),
        Value::UtcTime(UtcTime::new("170801120112Z").unwrap()),
        Value::GeneralizedTime(GeneralizedTime::new("20170801120112Z").unwrap()),
        Value::SequenceOf(
            SequenceOf::schema(Value::Integer(Integer::schema()))
                .with_items([
                    Value::Integer(Integer::new(3)),
                    Value::Integer(Integer::new(1)),
                    Value::Integer(Integer::new(2)),
                ])
                .unwrap(),
        ),
    ]
}

fn schema_of(value: &Value) -> Value {
    match value {
        Value::Boolean(_) => Value::Boolean(Boolean::schema()),
        Value::Integer(_) => Value::Integer(Integer::schema()),
        Value::BitString(_) => Value::BitString(BitString::schema()),
        Value::OctetString(_) => Value::OctetString(OctetString::schema()),
        Value::Null(_) => Value::Null(Null::schema()),
        Value::ObjectIdentifier(_) => Value::ObjectIdentifier(ObjectIdentifier::schema()),
        Value::Real(_) => Value::Real(Real::schema()),
        Value::CharacterString(v) => {
            Value::CharacterString(CharacterString::schema(v.kind()))
        }
        Value::UtcTime(_) => Value::UtcTime(UtcTime::schema()),
        Value::GeneralizedTime(_) => Value::GeneralizedTime(GeneralizedTime::schema()),
        Value::SequenceOf(_) => {
            Value::SequenceOf(SequenceOf::schema(Value::Integer(Integer::schema())))
        }
        other => panic!("no schema builder for {}", other.type_name()),
    }
}

#[test]
fn schema_aware_round_trip_in_every_dialect() {
    for value in sample_values() {
        let schema = schema_of(&value);

        for (name, encoded) in [
            ("BER-def", ber::encode(&value)),
            (
                "BER-indef",
                ber::encode_with(&value, &ber::EncoderOptions::ber_indefinite()),
            ),
            ("CER", cer::encode(&value)),
            ("DER", der::encode(&value)),
        ] {
            let encoded = encoded.unwrap_or_else(|e| panic!("{name} encode: {e}"));

            let (decoded, rest) = match name {
                "CER" => cer::decode_with(&encoded, &schema),
                "DER" => der::decode_with(&encoded, &schema),
                _ => ber::decode_with(&encoded, &schema),
            }
            .unwrap_or_else(|e| panic!("{name} decode of {}: {e}", value.type_name()));

            assert!(rest.is_empty(), "{name}: trailing bytes");
            assert_eq!(decoded, value, "{name}: value changed in transit");
        }
    }
}

#[test]
fn schemaless_round_trip_for_universal_values() {
    for value in sample_values() {
        let encoded = ber::encode(&value).unwrap();
        let (decoded, rest) = ber::decode(&encoded).unwrap();

        assert!(rest.is_empty());
        let re_encoded = ber::encode(&decoded).unwrap();
        assert_eq!(re_encoded, encoded, "{}", value.type_name());
    }
}

#[test]
fn der_idempotence() {
    for value in sample_values() {
        let schema = schema_of(&value);
        let wire = der::encode(&value).unwrap();
        let (decoded, _) = der::decode_with(&wire, &schema).unwrap();
        assert_eq!(der::encode(&decoded).unwrap(), wire);
    }
}

#[test]
fn tag_discipline_under_implicit_subtyping() {
    let tag = Tag::context(5);
    let value = Value::Integer(Integer::new(99)).subtype_implicit(tag);
    let schema = Value::Integer(Integer::schema()).subtype_implicit(tag);

    for encoded in [
        ber::encode(&value).unwrap(),
        der::encode(&value).unwrap(),
    ] {
        let (decoded, _) = ber::decode_with(&encoded, &schema).unwrap();
        assert_eq!(decoded.tag_set(), schema.tag_set());
    }
}

#[test]
fn tag_discipline_under_explicit_subtyping() {
    let tag = Tag::context(7);
    let value = Value::OctetString(OctetString::from("abc"))
        .subtype_explicit(tag)
        .unwrap();
    let schema = Value::OctetString(OctetString::schema())
        .subtype_explicit(tag)
        .unwrap();

    let encoded = der::encode(&value).unwrap();
    // Outer explicit wrapper, inner OCTET STRING.
    assert_eq!(encoded, hex!("A7 05 04 03 61 62 63"));

    let (decoded, _) = der::decode_with(&encoded, &schema).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded.tag_set(), schema.tag_set());
}

#[test]
fn constraint_closure() {
    let bounded = Value::Integer(Integer::schema())
        .constrained([Constraint::value_range(0, 100)])
        .unwrap();

    // A conforming value survives the round trip with constraints intact.
    let small = Value::Integer(Integer::new(42));
    let wire = der::encode(&small).unwrap();
    let (decoded, _) = der::decode_with(&wire, &bounded).unwrap();
    assert!(decoded.constraints().has_constraint(&Constraint::value_range(0, 100)));

    // A non-conforming value is rejected at decode time.
    let large = der::encode(&Value::Integer(Integer::new(1000))).unwrap();
    let err = der::decode_with(&large, &bounded).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::ConstraintViolation { .. }
    ));
}

#[test]
fn resumable_underrun_on_every_strict_prefix() {
    let value = Value::Sequence(
        Sequence::schema(
            NamedTypes::new([
                NamedType::new("flag", Value::Boolean(Boolean::schema())),
                NamedType::new("payload", Value::OctetString(OctetString::schema())),
                NamedType::new("count", Value::Integer(Integer::schema())),
            ])
            .unwrap(),
        )
        .with_component("flag", Value::Boolean(Boolean::new(true)))
        .unwrap()
        .with_component("payload", Value::OctetString(OctetString::from("lazy dog")))
        .unwrap()
        .with_component("count", Value::Integer(Integer::new(7)))
        .unwrap(),
    );

    let schema = schema_like(&value);
    let wire = der::encode(&value).unwrap();

    for cut in 0..wire.len() {
        let err = der::decode_with(&wire[..cut], &schema)
            .expect_err("prefix decode must not succeed");
        assert!(err.is_incomplete(), "cut at {cut}: {err}");
    }

    let (decoded, rest) = der::decode_with(&wire, &schema).unwrap();
    assert_eq!(decoded, value);
    assert!(rest.is_empty());
}

fn schema_like(value: &Value) -> Value {
    let Value::Sequence(seq) = value else {
        panic!("expected SEQUENCE");
    };
    Value::Sequence(Sequence::schema(seq.components().clone()))
}

#[test]
fn super_type_relations() {
    let base = Value::Integer(Integer::schema());
    let constrained = base.constrained([Constraint::value_range(0, 7)]).unwrap();
    let tagged = constrained.subtype_implicit(Tag::context(2));

    assert!(base.is_super_type_of(&constrained));
    assert!(!constrained.is_super_type_of(&base));
    // Implicit tagging replaces the outer tag, so the base is no longer a
    // suffix of the derived tag sequence.
    assert!(!base.is_super_type_of(&tagged));
    assert!(constrained.is_same_type_as(&constrained));
}

#[test]
fn set_of_round_trip_with_sorting() {
    let schema = SetOf::schema(Value::Integer(Integer::schema()));
    let value = Value::SetOf(
        schema
            .with_items([
                Value::Integer(Integer::new(300)),
                Value::Integer(Integer::new(2)),
                Value::Integer(Integer::new(100)),
            ])
            .unwrap(),
    );

    let wire = der::encode(&value).unwrap();
    // Sorted by encoding: 02 01 02, 02 01 64, 02 02 01 2C.
    assert_eq!(wire, hex!("31 0A 02 01 02 02 01 64 02 02 01 2C"));

    let (decoded, _) =
        der::decode_with(&wire, &Value::SetOf(SetOf::schema(Value::Integer(Integer::schema()))))
            .unwrap();

    let Value::SetOf(decoded) = decoded else {
        panic!("expected SET OF");
    };
    assert_eq!(decoded.len().unwrap(), 3);
}

#[test]
fn choice_in_sequence_window() {
    // A CHOICE component exposes its alternatives' tags to the enclosing
    // SEQUENCE's disambiguation window.
    let choice = Choice::schema(
        NamedTypes::new([
            NamedType::new("num", Value::Integer(Integer::schema())),
            NamedType::new("text", Value::OctetString(OctetString::schema())),
        ])
        .unwrap(),
    )
    .unwrap();

    let components = NamedTypes::new([
        NamedType::new("head", Value::Null(Null::schema())),
        NamedType::new("body", Value::Choice(choice.clone())),
    ])
    .unwrap();

    let value = Value::Sequence(
        Sequence::schema(components.clone())
            .with_component("head", Value::Null(Null::new()))
            .unwrap()
            .with_component(
                "body",
                Value::Choice(
                    choice
                        .with_chosen("text", Value::OctetString(OctetString::from("hi")))
                        .unwrap(),
                ),
            )
            .unwrap(),
    );

    let wire = der::encode(&value).unwrap();
    assert_eq!(wire, hex!("30 06 05 00 04 02 68 69"));

    let (decoded, _) =
        der::decode_with(&wire, &Value::Sequence(Sequence::schema(components))).unwrap();
    assert_eq!(decoded, value);
}
