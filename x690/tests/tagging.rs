//! Tagging on the wire: long-form tag numbers, stacked explicit tags and
//! the REAL special encodings.

use hex_literal::hex;
use x690::asn1::{Integer, OctetString, Real, Value};
use x690::{ber, der, Tag};

#[test]
fn long_form_tag_numbers() {
    let tag = Tag::application(1234);
    let value = Value::Integer(Integer::new(5)).subtype_implicit(tag);
    let schema = Value::Integer(Integer::schema()).subtype_implicit(tag);

    let wire = der::encode(&value).unwrap();
    // APPLICATION class, number 1234 in two base-128 octets.
    assert_eq!(wire, hex!("5F 89 52 01 05"));

    let (decoded, _) = der::decode_with(&wire, &schema).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn long_form_tag_with_redundant_leading_octet_rejected() {
    // Same tag number padded with a leading 0x80 continuation octet.
    let wire = hex!("5F 80 89 52 01 05");
    assert!(ber::decode(&wire).is_err());
}

#[test]
fn stacked_explicit_tags() {
    let value = Value::OctetString(OctetString::from("x"))
        .subtype_explicit(Tag::context(1))
        .unwrap()
        .subtype_explicit(Tag::application(2))
        .unwrap();

    let schema = Value::OctetString(OctetString::schema())
        .subtype_explicit(Tag::context(1))
        .unwrap()
        .subtype_explicit(Tag::application(2))
        .unwrap();

    let wire = der::encode(&value).unwrap();
    assert_eq!(wire, hex!("62 05 A1 03 04 01 78"));

    let (decoded, _) = der::decode_with(&wire, &schema).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded.tag_set().len(), 3);
    assert_eq!(decoded.tag_set().base_tag(), Some(Tag::OCTET_STRING));
}

#[test]
fn explicit_over_implicit_round_trip() {
    let value = Value::Integer(Integer::new(9))
        .subtype_implicit(Tag::context(0))
        .subtype_explicit(Tag::context(1))
        .unwrap();

    let schema = Value::Integer(Integer::schema())
        .subtype_implicit(Tag::context(0))
        .subtype_explicit(Tag::context(1))
        .unwrap();

    let wire = der::encode(&value).unwrap();
    assert_eq!(wire, hex!("A1 03 80 01 09"));

    let (decoded, _) = der::decode_with(&wire, &schema).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn real_special_values() {
    for (value, body) in [
        (Real::infinity(false), hex!("09 01 40").to_vec()),
        (Real::infinity(true), hex!("09 01 41").to_vec()),
        (Real::nan(), hex!("09 01 42").to_vec()),
        (Real::from_f64(-0.0), hex!("09 01 43").to_vec()),
        (Real::from_f64(0.0), hex!("09 00").to_vec()),
    ] {
        let value = Value::Real(value);
        let wire = der::encode(&value).unwrap();
        assert_eq!(wire, body);

        let (decoded, _) = der::decode_with(&wire, &Value::Real(Real::schema())).unwrap();
        assert_eq!(decoded, value);
    }
}

#[test]
fn real_binary_form_round_trip() {
    let value = Value::Real(Real::new(5, 2, -3).unwrap());
    let wire = der::encode(&value).unwrap();
    // 0.625 = 5 * 2^-3: sign +, one exponent octet, odd mantissa.
    assert_eq!(wire, hex!("09 03 80 FD 05"));

    let (decoded, _) = der::decode_with(&wire, &Value::Real(Real::schema())).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn real_decimal_forms_accepted() {
    // NR3 form "15E-1" = 1.5.
    let wire = hex!("09 06 03 31 35 45 2D 31");
    let (decoded, _) = ber::decode_with(&wire, &Value::Real(Real::schema())).unwrap();

    let Value::Real(real) = decoded else {
        panic!("expected REAL");
    };
    assert_eq!(real.to_f64().unwrap(), 1.5);
}

#[test]
fn real_scaled_base_16_accepted() {
    // mantissa 1, base 16, exponent 1, scale 2: 1 * 2^2 * 16^1 = 64.
    let wire = hex!("09 03 A8 01 01");
    let (decoded, _) = ber::decode_with(&wire, &Value::Real(Real::schema())).unwrap();

    let Value::Real(real) = decoded else {
        panic!("expected REAL");
    };
    assert_eq!(real.to_f64().unwrap(), 64.0);
}
