//! End-to-end wire scenarios.

use hex_literal::hex;
use x690::asn1::{
    BitString, Choice, Integer, Null, ObjectIdentifier, OctetString, UtcTime, Value,
};
use x690::{ber, der, NamedType, NamedTypes, Tag};

#[test]
fn integer_zero() {
    let value = Value::Integer(Integer::new(0));
    let wire = der::encode(&value).unwrap();
    assert_eq!(wire, hex!("02 01 00"));

    let (decoded, rest) = der::decode_with(&wire, &Value::Integer(Integer::schema())).unwrap();
    assert_eq!(decoded, value);
    assert!(rest.is_empty());
}

#[test]
fn integer_minus_one_schemaless() {
    let wire = der::encode(&Value::Integer(Integer::new(-1))).unwrap();
    assert_eq!(wire, hex!("02 01 FF"));

    let (decoded, _) = ber::decode(&wire).unwrap();
    let Value::Integer(int) = decoded else {
        panic!("expected INTEGER");
    };
    assert_eq!(int.to_i64().unwrap(), -1);
}

#[test]
fn oid_with_large_arc() {
    let oid = ObjectIdentifier::new(vec![1, 3, 6, 0, 0xF_FFFE]).unwrap();
    let wire = der::encode(&Value::ObjectIdentifier(oid.clone())).unwrap();
    assert_eq!(wire, hex!("06 06 2B 06 00 BF FF 7E"));

    let (decoded, _) =
        der::decode_with(&wire, &Value::ObjectIdentifier(ObjectIdentifier::schema())).unwrap();
    assert_eq!(decoded, Value::ObjectIdentifier(oid));
}

#[test]
fn oid_with_redundant_leading_continuation_rejected() {
    // The same arc padded with a leading 0x80 continuation octet.
    let wire = hex!("06 07 2B 06 00 80 BF FF 7E");
    let schema = Value::ObjectIdentifier(ObjectIdentifier::schema());

    assert!(der::decode_with(&wire, &schema).is_err());
    assert!(ber::decode_with(&wire, &schema).is_err());
}

#[test]
fn bit_string_fifteen_bits() {
    let bits = [1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 1].map(|b| b == 1);
    let value = Value::BitString(BitString::new(bits));

    let wire = der::encode(&value).unwrap();
    assert_eq!(wire, hex!("03 03 01 A9 8A"));

    let (decoded, _) = der::decode_with(&wire, &Value::BitString(BitString::schema())).unwrap();
    assert_eq!(decoded, value);
}

fn s5_schema() -> NamedTypes {
    NamedTypes::new([
        NamedType::new("null", Value::Null(Null::schema())),
        NamedType::optional("payload", Value::OctetString(OctetString::schema())),
        NamedType::defaulted("age", Value::Integer(Integer::new(33))).unwrap(),
    ])
    .unwrap()
}

#[test]
fn sequence_with_optional_and_default() {
    use x690::asn1::Sequence;

    let value = Sequence::schema(s5_schema())
        .with_component("null", Value::Null(Null::new()))
        .unwrap()
        .with_component("payload", Value::OctetString(OctetString::from("quick brown")))
        .unwrap()
        .with_component("age", Value::Integer(Integer::new(1)))
        .unwrap();
    let value = Value::Sequence(value);

    let definite = ber::encode(&value).unwrap();
    assert_eq!(
        definite,
        hex!("30 12 05 00 04 0B 71 75 69 63 6B 20 62 72 6F 77 6E 02 01 01")
    );

    let indefinite = ber::encode_with(&value, &ber::EncoderOptions::ber_indefinite()).unwrap();
    assert_eq!(
        indefinite,
        hex!("30 80 05 00 04 0B 71 75 69 63 6B 20 62 72 6F 77 6E 02 01 01 00 00")
    );

    let schema = Value::Sequence(Sequence::schema(s5_schema()));
    let (from_def, _) = ber::decode_with(&definite, &schema).unwrap();
    let (from_indef, _) = ber::decode_with(&indefinite, &schema).unwrap();
    assert_eq!(from_def, value);
    assert_eq!(from_indef, value);
}

#[test]
fn sequence_default_value_omitted_and_refilled() {
    use x690::asn1::Sequence;

    let value = Sequence::schema(s5_schema())
        .with_component("null", Value::Null(Null::new()))
        .unwrap()
        .with_component("age", Value::Integer(Integer::new(33)))
        .unwrap();

    // age equals its default: omitted on the wire.
    let wire = der::encode(&Value::Sequence(value)).unwrap();
    assert_eq!(wire, hex!("30 02 05 00"));

    let schema = Value::Sequence(Sequence::schema(s5_schema()));
    let (decoded, _) = der::decode_with(&wire, &schema).unwrap();

    let Value::Sequence(seq) = decoded else {
        panic!("expected SEQUENCE");
    };
    assert_eq!(
        seq.component("age").unwrap(),
        Some(&Value::Integer(Integer::new(33)))
    );
    assert_eq!(seq.component("payload").unwrap(), None);
}

#[test]
fn choice_is_transparent_on_the_wire() {
    let choice = Choice::schema(
        NamedTypes::new([
            NamedType::new("name", Value::OctetString(OctetString::schema())),
            NamedType::new("id", Value::Integer(Integer::schema())),
        ])
        .unwrap(),
    )
    .unwrap();

    let value = choice
        .with_chosen("id", Value::Integer(Integer::new(1)))
        .unwrap();

    let wire = der::encode(&Value::Choice(value.clone())).unwrap();
    assert_eq!(wire, hex!("02 01 01"));
    assert_eq!(value.effective_tag_set().outer_tag(), Some(Tag::INTEGER));

    let (decoded, _) = der::decode_with(&wire, &Value::Choice(choice)).unwrap();
    let Value::Choice(decoded) = decoded else {
        panic!("expected CHOICE");
    };
    let (chosen_name, chosen_value) = decoded.chosen().unwrap();
    assert_eq!(chosen_name, "id");
    assert_eq!(chosen_value, &Value::Integer(Integer::new(1)));
}

#[test]
fn utc_time_der() {
    let value = Value::UtcTime(UtcTime::new("170801120112Z").unwrap());
    let wire = der::encode(&value).unwrap();
    assert_eq!(wire, hex!("17 0D 31 37 30 38 30 31 31 32 30 31 31 32 5A"));

    let (decoded, _) = der::decode_with(&wire, &Value::UtcTime(UtcTime::schema())).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn utc_time_non_canonical_rejected_under_der() {
    let schema = Value::UtcTime(UtcTime::schema());

    // Missing seconds.
    let no_seconds = hex!("17 0B 31 37 30 38 30 31 31 32 30 31 5A");
    assert!(der::decode_with(&no_seconds, &schema).is_err());
    assert!(ber::decode_with(&no_seconds, &schema).is_ok());

    // Offset zone instead of Z.
    let offset = hex!("17 11 31 37 30 38 30 31 31 32 30 31 31 32 2B 30 32 30 30");
    assert!(der::decode_with(&offset, &schema).is_err());
    assert!(ber::decode_with(&offset, &schema).is_ok());

    // Encoding a non-canonical payload under DER fails too.
    let lenient = Value::UtcTime(UtcTime::new("1708011201Z").unwrap());
    assert!(der::encode(&lenient).is_err());
    assert!(ber::encode(&lenient).is_ok());
}
