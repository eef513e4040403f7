//! BER-family streaming decoder.
//!
//! One decoder serves all three dialects; [`DecoderOptions`] selects the
//! rule set and the canonical checks that come with it. Decoding walks the
//! schema in parallel with the substrate: the schema resolves ambiguity
//! (tagged subtypes, `OPTIONAL`/`DEFAULT` windows, `CHOICE` dispatch, open
//! types) and the substrate drives the tag-length-value state flow.

use crate::asn1::string::StrKind;
use crate::asn1::{
    Any, BitString, Boolean, CharacterString, Choice, Enumerated, GeneralizedTime, Integer, Null,
    ObjectIdentifier, OctetString, Real, RealValue, Sequence, SequenceOf, Set, SetOf, UtcTime,
    Value,
};
use crate::ber::EncodingRules;
use crate::namedtype::ComponentKind;
use crate::{
    Class, EncodedLength, ErrorKind, Format, Header, Length, NamedTypes, Result, Tag, TagNumber,
    TagSet,
};
use bytes::Bytes;
use core::num::NonZeroUsize;
use num_bigint::BigInt;
use tracing::trace;

/// Decoder configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DecoderOptions {
    rules: EncodingRules,
    resolve_open_types: bool,
}

impl DecoderOptions {
    /// Basic Encoding Rules.
    pub fn ber() -> Self {
        Self {
            rules: EncodingRules::Ber,
            resolve_open_types: false,
        }
    }

    /// Canonical Encoding Rules.
    pub fn cer() -> Self {
        Self {
            rules: EncodingRules::Cer,
            ..Self::ber()
        }
    }

    /// Distinguished Encoding Rules.
    pub fn der() -> Self {
        Self {
            rules: EncodingRules::Der,
            ..Self::ber()
        }
    }

    /// Enable the open-type second pass: after a constructed value decodes,
    /// `ANY` carriers with open-type bindings are re-decoded under the
    /// schema resolved through their discriminator sibling.
    pub fn with_open_types(mut self, resolve: bool) -> Self {
        self.resolve_open_types = resolve;
        self
    }

    /// Selected rule set.
    pub fn rules(&self) -> EncodingRules {
        self.rules
    }
}

/// Decode one value from `bytes` without a schema, returning the value and
/// the unconsumed remainder.
///
/// Values decode typed by their wire tags; tag information erased by
/// implicit tagging cannot be recovered this way.
pub fn decode(bytes: &[u8]) -> Result<(Value, &[u8])> {
    decode_with_options(bytes, None, &DecoderOptions::ber())
}

/// Decode one value of the type described by `schema`, returning the value
/// and the unconsumed remainder.
pub fn decode_with<'a>(bytes: &'a [u8], schema: &Value) -> Result<(Value, &'a [u8])> {
    decode_with_options(bytes, Some(schema), &DecoderOptions::ber())
}

/// Decode one value under explicit [`DecoderOptions`].
pub fn decode_with_options<'a>(
    bytes: &'a [u8],
    schema: Option<&Value>,
    options: &DecoderOptions,
) -> Result<(Value, &'a [u8])> {
    let mut decoder = Decoder::new(bytes, *options);
    let value = decoder.decode_value(schema)?;
    Ok((value, decoder.remaining()))
}

/// Strict variant of [`decode_with_options`]: trailing data is an error.
pub fn decode_exact(bytes: &[u8], schema: Option<&Value>, options: &DecoderOptions) -> Result<Value> {
    let (value, remainder) = decode_with_options(bytes, schema, options)?;

    if !remainder.is_empty() {
        return Err(ErrorKind::TrailingData {
            decoded: Length::try_from(bytes.len() - remainder.len())?,
            remaining: Length::try_from(remainder.len())?,
        }
        .into());
    }

    Ok(value)
}

/// BER-family decoder over a byte substrate.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    /// Substrate being decoded.
    bytes: &'a [u8],

    /// Position within the substrate.
    pos: usize,

    /// Rule set and decode-time switches.
    options: DecoderOptions,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder over the given substrate.
    pub fn new(bytes: &'a [u8], options: DecoderOptions) -> Self {
        Self {
            bytes,
            pos: 0,
            options,
        }
    }

    /// Unconsumed remainder of the substrate.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// Have all bytes been consumed?
    pub fn is_finished(&self) -> bool {
        self.remaining().is_empty()
    }

    /// Current position as a [`Length`].
    fn position(&self) -> Length {
        Length::try_from(self.pos).unwrap_or_default()
    }

    fn error(&self, kind: ErrorKind) -> crate::Error {
        kind.at(self.position())
    }

    fn underrun(&self, needed: usize) -> crate::Error {
        self.error(ErrorKind::Incomplete {
            needed: NonZeroUsize::new(needed),
        })
    }

    /// Decode a single byte, updating the internal cursor.
    fn byte(&mut self) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| self.underrun(1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Obtain `len` bytes from the current position, or signal an underrun
    /// carrying the missing byte count.
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining().len() {
            return Err(self.underrun(len - self.remaining().len()));
        }

        let result = &self.remaining()[..len];
        self.pos += len;
        Ok(result)
    }

    /// Decode the identifier octets.
    fn read_tag(&mut self) -> Result<Tag> {
        let leading = self.byte()?;
        let class = Class::from_octet(leading);
        let format = Format::from_octet(leading);
        let low = leading & 0b0001_1111;

        let number = if low < TagNumber::LONG_FORM {
            u32::from(low)
        } else {
            // Long form: base-128 big-endian with the high bit of each
            // octet as continuation. A leading 0x80 octet would encode a
            // redundant zero and is rejected.
            let mut number: u32 = 0;
            let mut first = true;

            loop {
                let octet = self.byte()?;

                if first && octet == 0x80 {
                    return Err(self.error(ErrorKind::Noncanonical));
                }
                first = false;

                number = number
                    .checked_mul(128)
                    .ok_or_else(|| self.error(ErrorKind::Overflow))?
                    | u32::from(octet & 0x7F);

                if octet & 0x80 == 0 {
                    break;
                }
            }

            number
        };

        Ok(Tag::new(class, format, TagNumber::new(number)))
    }

    /// Decode the length octets.
    fn read_length(&mut self) -> Result<EncodedLength> {
        let leading = self.byte()?;

        if leading == 0x80 {
            if self.options.rules.is_der() {
                return Err(self.error(ErrorKind::Length { tag: None }));
            }
            return Ok(EncodedLength::Indefinite);
        }

        if leading < 0x80 {
            return Ok(Length::from(leading).into());
        }

        // 0xFF is reserved by X.690 Section 8.1.3.5 c).
        if leading == 0xFF {
            return Err(self.error(ErrorKind::Length { tag: None }));
        }

        let count = usize::from(leading & 0x7F);
        if count > 4 {
            return Err(self.error(ErrorKind::Length { tag: None }));
        }

        let mut value: u32 = 0;
        for &octet in self.take(count)? {
            value = value << 8 | u32::from(octet);
        }

        if self.options.rules.is_canonical() {
            // X.690 Section 10.1: minimum number of length octets.
            let minimal = Length::from(value).octet_count();
            if minimal != count + 1 {
                return Err(self.error(ErrorKind::Noncanonical));
            }
        }

        Ok(Length::from(value).into())
    }

    /// Decode a TLV header.
    fn read_header(&mut self) -> Result<Header> {
        let tag = self.read_tag()?;
        let length = self.read_length()?;

        if length.is_indefinite() && !tag.is_constructed() {
            return Err(self.error(ErrorKind::Length { tag: Some(tag) }));
        }

        Ok(Header::new(tag, length))
    }

    /// Read a header without consuming it.
    fn peek_header(&self) -> Result<Header> {
        self.clone().read_header()
    }

    /// Are the next two octets an end-of-contents marker?
    fn at_eoc(&self) -> Result<bool> {
        match self.remaining() {
            [0x00, 0x00, ..] => Ok(true),
            [] | [0x00] => Err(self.underrun(2 - self.remaining().len())),
            _ => Ok(false),
        }
    }

    fn expect_eoc(&mut self) -> Result<()> {
        if self.at_eoc()? {
            self.pos += 2;
            Ok(())
        } else {
            Err(self.error(ErrorKind::Value {
                tag: Tag::universal(0),
            }))
        }
    }

    /// Skip one complete TLV.
    fn skip_tlv(&mut self) -> Result<()> {
        let header = self.read_header()?;

        match header.length {
            EncodedLength::Definite(len) => {
                self.take(usize::from(len))?;
            }
            EncodedLength::Indefinite => loop {
                if self.at_eoc()? {
                    self.pos += 2;
                    break;
                }
                self.skip_tlv()?;
            },
        }

        Ok(())
    }

    /// Capture one complete TLV as raw bytes.
    fn capture_tlv(&mut self) -> Result<Bytes> {
        let start = self.pos;
        self.skip_tlv()?;
        Ok(Bytes::copy_from_slice(&self.bytes[start..self.pos]))
    }

    /// Decode one value, guided by `schema` when present.
    pub fn decode_value(&mut self, schema: Option<&Value>) -> Result<Value> {
        match schema {
            Some(schema) => self.item_with_schema(schema),
            None => self.item_schemaless(),
        }
    }

    /// Run `f` over the content octets delimited by `length`.
    ///
    /// For the definite form the content is sliced out and must be fully
    /// consumed; for the indefinite form `f` reads from this decoder and
    /// the end-of-contents marker is consumed afterwards.
    fn in_content<T>(
        &mut self,
        length: EncodedLength,
        f: impl FnOnce(&mut Decoder<'a>) -> Result<T>,
    ) -> Result<T> {
        match length {
            EncodedLength::Definite(len) => {
                let base = self.position();
                let body = self.take(usize::from(len))?;
                let mut inner = Decoder::new(body, self.options);
                let result = f(&mut inner).map_err(|e| e.nested(base))?;

                if !inner.is_finished() {
                    return Err(ErrorKind::TrailingData {
                        decoded: inner.position(),
                        remaining: Length::try_from(inner.remaining().len())?,
                    }
                    .at(base));
                }

                Ok(result)
            }
            EncodedLength::Indefinite => {
                let result = f(self)?;
                self.expect_eoc()?;
                Ok(result)
            }
        }
    }

    /// Iterate `each` over the children of a constructed content.
    fn decode_children(
        &mut self,
        length: EncodedLength,
        mut each: impl FnMut(&mut Decoder<'a>) -> Result<()>,
    ) -> Result<()> {
        match length {
            EncodedLength::Definite(len) => {
                let base = self.position();
                let body = self.take(usize::from(len))?;
                let mut inner = Decoder::new(body, self.options);

                while !inner.is_finished() {
                    each(&mut inner).map_err(|e| e.nested(base))?;
                }

                Ok(())
            }
            EncodedLength::Indefinite => {
                loop {
                    if self.at_eoc()? {
                        self.pos += 2;
                        return Ok(());
                    }
                    each(self)?;
                }
            }
        }
    }

    /// Schema-guided decoding of one item.
    fn item_with_schema(&mut self, schema: &Value) -> Result<Value> {
        trace!(schema = schema.type_name(), position = self.pos, "decode item");

        let tag_set = schema.tag_set().clone();

        // Untagged types never read a header of their own.
        if tag_set.is_empty() {
            return match schema {
                Value::Choice(choice) => self.choice_by_tag(choice),
                Value::Any(any) => {
                    let raw = self.capture_tlv()?;
                    Ok(Value::Any(any.with_value(raw)?))
                }
                _ => Err(self.error(ErrorKind::ComponentMismatch)),
            };
        }

        let expected = tag_set.outer_tag().ok_or(ErrorKind::UnresolvedChoice)?;
        let header = self.read_header()?;

        if header.tag == expected {
            if tag_set.len() > 1 {
                // Explicit wrapper: unwrap one tagging level and decode the
                // inner value against the remainder of the tag set.
                if !header.tag.is_constructed() {
                    return Err(self.error(ErrorKind::Value { tag: header.tag }));
                }

                let inner_schema = schema.retagged(tag_set.without_outer());
                let inner =
                    self.in_content(header.length, |d| d.item_with_schema(&inner_schema))?;
                return Ok(inner.retagged(tag_set));
            }

            return self.decode_body(schema, header);
        }

        // The tag does not match the schema at this position. A constructed
        // non-universal tag may be an explicit wrapper the schema does not
        // spell out; strip it and retry against the same schema.
        if header.tag.is_constructed() && !header.tag.is_universal() {
            return self.in_content(header.length, |d| d.item_with_schema(schema));
        }

        Err(self.error(ErrorKind::UnexpectedTag {
            expected: Some(expected),
            actual: header.tag,
        }))
    }

    /// Dispatch an untagged `CHOICE` by the tag of the alternative present
    /// on the wire.
    fn choice_by_tag(&mut self, choice: &Choice) -> Result<Value> {
        let tag = self.peek_header()?.tag;
        let alternatives = choice.alternatives();

        let position = alternatives
            .position_of_tag(tag)
            .ok_or_else(|| {
                self.error(ErrorKind::UnexpectedTag {
                    expected: None,
                    actual: tag,
                })
            })?;

        let value = self.item_with_schema(alternatives.type_at(position)?)?;

        let mut result = choice.clone();
        result.set_chosen(position, value);
        Ok(Value::Choice(result))
    }

    /// Decode the body of a value whose outermost tag has been consumed.
    fn decode_body(&mut self, schema: &Value, header: Header) -> Result<Value> {
        match schema {
            Value::Boolean(v) => {
                let body = self.primitive_body(header)?;
                Ok(Value::Boolean(v.with_value(self.boolean_body(body)?)?))
            }
            Value::Integer(v) => {
                let body = self.primitive_body(header)?;
                Ok(Value::Integer(v.with_value(self.integer_body(body)?)?))
            }
            Value::Enumerated(v) => {
                let body = self.primitive_body(header)?;
                Ok(Value::Enumerated(v.with_value(self.integer_body(body)?)?))
            }
            Value::Null(v) => {
                let body = self.primitive_body(header)?;
                if !body.is_empty() {
                    return Err(self.error(ErrorKind::Value { tag: Tag::NULL }));
                }
                Ok(Value::Null(v.with_value()))
            }
            Value::ObjectIdentifier(v) => {
                let body = self.primitive_body(header)?;
                Ok(Value::ObjectIdentifier(v.with_arcs(self.oid_body(body)?)?))
            }
            Value::Real(v) => {
                let body = self.primitive_body(header)?;
                Ok(Value::Real(v.with_value(self.real_body(body)?)?))
            }
            Value::BitString(v) => {
                let (bytes, unused) = self.bit_string_body(header)?;
                Ok(Value::BitString(v.with_bytes(&bytes, unused)?))
            }
            Value::OctetString(v) => {
                let bytes = self.string_body(header)?;
                Ok(Value::OctetString(v.with_value(bytes)?))
            }
            Value::CharacterString(v) => {
                let bytes = self.string_body(header)?;
                Ok(Value::CharacterString(v.with_octets(&bytes)?))
            }
            Value::UtcTime(v) => {
                let bytes = self.string_body(header)?;
                let text = ascii_body(&bytes, Tag::UTC_TIME)?;
                let value = v.with_value(text)?;

                if self.options.rules.is_canonical() && !value.is_canonical()? {
                    return Err(self.error(ErrorKind::Noncanonical));
                }

                Ok(Value::UtcTime(value))
            }
            Value::GeneralizedTime(v) => {
                let bytes = self.string_body(header)?;
                let text = ascii_body(&bytes, Tag::GENERALIZED_TIME)?;
                let value = v.with_value(text)?;

                if self.options.rules.is_canonical() && !value.is_canonical()? {
                    return Err(self.error(ErrorKind::Noncanonical));
                }

                Ok(Value::GeneralizedTime(value))
            }
            Value::SequenceOf(v) => self.sequence_of_body(v, header),
            Value::SetOf(v) => self.set_of_body(v, header),
            Value::Sequence(v) => self.sequence_body(v, header),
            Value::Set(v) => self.set_body(v, header),
            Value::Choice(choice) => {
                // A tagged CHOICE wraps its chosen alternative explicitly.
                self.require_constructed(header)?;
                self.in_content(header.length, |d| {
                    let inner = d.choice_by_tag(&untagged(choice))?;
                    Ok(inner.retagged(choice.tag_set().clone()))
                })
            }
            Value::Any(any) => {
                // A tagged ANY carries opaque content octets.
                let raw = self.content_octets(header)?;
                Ok(Value::Any(any.with_value(raw)?))
            }
        }
    }

    fn require_constructed(&self, header: Header) -> Result<()> {
        if !header.tag.is_constructed() {
            return Err(self.error(ErrorKind::Value { tag: header.tag }));
        }
        Ok(())
    }

    /// Content of a primitive-only type: constructed form is illegal for
    /// these under every rule set.
    fn primitive_body(&mut self, header: Header) -> Result<&'a [u8]> {
        if header.tag.is_constructed() {
            return Err(self.error(ErrorKind::Value { tag: header.tag }));
        }

        match header.length {
            EncodedLength::Definite(len) => self.take(usize::from(len)),
            // read_header rejects indefinite primitive headers already.
            EncodedLength::Indefinite => Err(self.error(ErrorKind::Length {
                tag: Some(header.tag),
            })),
        }
    }

    /// Raw content octets (definite or indefinite) without interpretation.
    fn content_octets(&mut self, header: Header) -> Result<Bytes> {
        match header.length {
            EncodedLength::Definite(len) => {
                Ok(Bytes::copy_from_slice(self.take(usize::from(len))?))
            }
            EncodedLength::Indefinite => {
                let start = self.pos;
                loop {
                    if self.at_eoc()? {
                        let raw = Bytes::copy_from_slice(&self.bytes[start..self.pos]);
                        self.pos += 2;
                        return Ok(raw);
                    }
                    self.skip_tlv()?;
                }
            }
        }
    }

    fn boolean_body(&self, body: &[u8]) -> Result<bool> {
        let [octet] = body else {
            return Err(self.error(ErrorKind::Length {
                tag: Some(Tag::BOOLEAN),
            }));
        };

        if self.options.rules.is_canonical() && *octet != 0x00 && *octet != 0xFF {
            return Err(self.error(ErrorKind::Value { tag: Tag::BOOLEAN }));
        }

        Ok(*octet != 0x00)
    }

    fn integer_body(&self, body: &[u8]) -> Result<BigInt> {
        if body.is_empty() {
            if self.options.rules.is_canonical() {
                return Err(self.error(ErrorKind::Length {
                    tag: Some(Tag::INTEGER),
                }));
            }
            return Ok(BigInt::from(0));
        }

        if self.options.rules.is_canonical() && body.len() > 1 {
            // X.690 Section 8.3.2: no redundant leading octets.
            let redundant = (body[0] == 0x00 && body[1] < 0x80)
                || (body[0] == 0xFF && body[1] >= 0x80);
            if redundant {
                return Err(self.error(ErrorKind::Noncanonical));
            }
        }

        Ok(BigInt::from_signed_bytes_be(body))
    }

    fn oid_body(&self, body: &[u8]) -> Result<Vec<u64>> {
        let malformed = || {
            self.error(ErrorKind::Value {
                tag: Tag::OBJECT_IDENTIFIER,
            })
        };

        if body.is_empty() {
            return Err(malformed());
        }

        let mut arcs = Vec::new();
        let mut iter = body.iter().copied().peekable();

        // X.690 Section 8.19.4: the leading sub-identifier folds the first
        // two arcs as arc0 * 40 + arc1.
        let mut first = true;

        while iter.peek().is_some() {
            let mut sub_id: u64 = 0;
            let mut continued = true;
            let mut leading = true;

            while continued {
                let octet = iter.next().ok_or_else(malformed)?;

                // A leading 0x80 continuation octet is a non-minimal
                // encoding.
                if leading && octet == 0x80 {
                    return Err(malformed());
                }
                leading = false;

                sub_id = sub_id
                    .checked_mul(128)
                    .ok_or_else(|| self.error(ErrorKind::Overflow))?
                    | u64::from(octet & 0x7F);
                continued = octet & 0x80 != 0;
            }

            if first {
                first = false;
                let (arc0, arc1) = if sub_id < 80 {
                    (sub_id / 40, sub_id % 40)
                } else {
                    (2, sub_id - 80)
                };
                arcs.push(arc0);
                arcs.push(arc1);
            } else {
                arcs.push(sub_id);
            }
        }

        Ok(arcs)
    }

    fn real_body(&self, body: &[u8]) -> Result<RealValue> {
        let malformed = || self.error(ErrorKind::Value { tag: Tag::REAL });

        let Some((&leading, rest)) = body.split_first() else {
            return Ok(RealValue::Finite {
                mantissa: 0,
                base: 2,
                exponent: 0,
            });
        };

        if leading & 0x80 != 0 {
            return self.binary_real(leading, rest);
        }

        if leading & 0x40 != 0 {
            // X.690 Section 8.5.9: special values.
            return match leading {
                0x40 => Ok(RealValue::Infinity { negative: false }),
                0x41 => Ok(RealValue::Infinity { negative: true }),
                0x42 => Ok(RealValue::NotANumber),
                0x43 => Ok(RealValue::MinusZero),
                _ => Err(malformed()),
            };
        }

        // ISO 6093 decimal forms NR1-NR3.
        if !(1..=3).contains(&(leading & 0x3F)) {
            return Err(malformed());
        }

        let text = core::str::from_utf8(rest).map_err(|_| malformed())?;
        let text = text.trim().replace(',', ".");
        let parsed: f64 = text.parse().map_err(|_| malformed())?;
        Ok(RealValue::from_f64(parsed))
    }

    fn binary_real(&self, leading: u8, rest: &[u8]) -> Result<RealValue> {
        let malformed = || self.error(ErrorKind::Value { tag: Tag::REAL });

        let negative = leading & 0x40 != 0;
        let base_exponent_scale = match (leading >> 4) & 0x3 {
            0 => 1, // base 2
            1 => 3, // base 8 = 2^3
            2 => 4, // base 16 = 2^4
            _ => return Err(malformed()),
        };
        let scale = i32::from((leading >> 2) & 0x3);

        let (exponent_octets, mantissa_octets) = match leading & 0x3 {
            0 => try_split(rest, 1).ok_or_else(malformed)?,
            1 => try_split(rest, 2).ok_or_else(malformed)?,
            2 => try_split(rest, 3).ok_or_else(malformed)?,
            _ => {
                let (&count, tail) = rest.split_first().ok_or_else(malformed)?;
                try_split(tail, usize::from(count)).ok_or_else(malformed)?
            }
        };

        if exponent_octets.is_empty() || exponent_octets.len() > 4 {
            return Err(malformed());
        }

        let mut exponent: i64 = if exponent_octets[0] & 0x80 != 0 { -1 } else { 0 };
        for &octet in exponent_octets {
            exponent = exponent << 8 | i64::from(octet);
        }

        let mut mantissa: u64 = 0;
        for &octet in mantissa_octets {
            mantissa = mantissa
                .checked_mul(256)
                .ok_or_else(|| self.error(ErrorKind::Overflow))?
                + u64::from(octet);
        }

        let mantissa = i64::try_from(mantissa).map_err(|_| self.error(ErrorKind::Overflow))?;
        let mantissa = if negative { -mantissa } else { mantissa };

        let exponent = exponent
            .checked_mul(base_exponent_scale)
            .and_then(|e| e.checked_add(i64::from(scale)))
            .and_then(|e| i32::try_from(e).ok())
            .ok_or_else(|| self.error(ErrorKind::Overflow))?;

        Ok(RealValue::Finite {
            mantissa,
            base: 2,
            exponent,
        })
    }

    /// Content of a `BIT STRING`: primitive or (BER/CER) constructed form.
    fn bit_string_body(&mut self, header: Header) -> Result<(Vec<u8>, u8)> {
        if !header.tag.is_constructed() {
            let body = match header.length {
                EncodedLength::Definite(len) => self.take(usize::from(len))?,
                EncodedLength::Indefinite => {
                    return Err(self.error(ErrorKind::Length {
                        tag: Some(header.tag),
                    }))
                }
            };

            let Some((&unused, content)) = body.split_first() else {
                return Err(self.error(ErrorKind::Value {
                    tag: Tag::BIT_STRING,
                }));
            };

            if unused > 7 || (content.is_empty() && unused != 0) {
                return Err(self.error(ErrorKind::Value {
                    tag: Tag::BIT_STRING,
                }));
            }

            if self.options.rules.is_canonical() {
                // Unused bits of the final octet must be zero.
                if unused > 0 {
                    let last = content.last().copied().unwrap_or(0);
                    if last & ((1 << unused) - 1) != 0 {
                        return Err(self.error(ErrorKind::Noncanonical));
                    }
                }

                // CER caps primitive form at 1000 bits.
                if self.options.rules == EncodingRules::Cer {
                    let bits = content.len() * 8 - usize::from(unused);
                    if bits > 1000 {
                        return Err(self.error(ErrorKind::Noncanonical));
                    }
                }
            }

            return Ok((content.to_vec(), unused));
        }

        if self.options.rules.is_der() {
            return Err(self.error(ErrorKind::Noncanonical));
        }

        // Constructed form: a series of nested BIT STRING encodings; every
        // chunk but the last must claim zero unused bits.
        let outer = header.tag;
        let mut bits: Vec<u8> = Vec::new();
        let mut unused_bits: u8 = 0;

        self.decode_children(header.length, |d| {
            let child = d.peek_header()?;

            if child.tag != Tag::BIT_STRING && child.tag != outer {
                return Err(d.error(ErrorKind::UnexpectedTag {
                    expected: Some(Tag::BIT_STRING),
                    actual: child.tag,
                }));
            }

            if unused_bits != 0 {
                // A non-terminal chunk claimed unused bits.
                return Err(d.error(ErrorKind::Value {
                    tag: Tag::BIT_STRING,
                }));
            }

            let child = d.read_header()?;
            let (chunk, unused) = d.bit_string_body(child)?;
            bits.extend_from_slice(&chunk);
            unused_bits = unused;
            Ok(())
        })?;

        Ok((bits, unused_bits))
    }

    /// Content of an `OCTET STRING`-shaped type: primitive or (BER/CER)
    /// constructed form, concatenated.
    fn string_body(&mut self, header: Header) -> Result<Vec<u8>> {
        if !header.tag.is_constructed() {
            let body = match header.length {
                EncodedLength::Definite(len) => self.take(usize::from(len))?,
                EncodedLength::Indefinite => {
                    return Err(self.error(ErrorKind::Length {
                        tag: Some(header.tag),
                    }))
                }
            };

            if self.options.rules == EncodingRules::Cer && body.len() > 1000 {
                return Err(self.error(ErrorKind::Noncanonical));
            }

            return Ok(body.to_vec());
        }

        if self.options.rules.is_der() {
            return Err(self.error(ErrorKind::Noncanonical));
        }

        let outer = header.tag;
        let mut octets: Vec<u8> = Vec::new();

        self.decode_children(header.length, |d| {
            let child = d.peek_header()?;

            // Segments carry the string's own tag or the OCTET STRING tag.
            if child.tag != outer && child.tag != Tag::OCTET_STRING {
                return Err(d.error(ErrorKind::UnexpectedTag {
                    expected: Some(outer),
                    actual: child.tag,
                }));
            }

            let child = d.read_header()?;
            octets.extend_from_slice(&d.string_body(child)?);
            Ok(())
        })?;

        Ok(octets)
    }

    fn sequence_of_body(&mut self, schema: &SequenceOf, header: Header) -> Result<Value> {
        self.require_constructed(header)?;

        let mut result = schema.clone();
        let element = schema.element().clone();

        self.decode_children(header.length, |d| {
            let item = d.item_with_schema(&element)?;
            result.push_unchecked(item);
            Ok(())
        })?;

        if !result.has_value() {
            result = schema.with_items(Vec::new())?;
        }

        result.check_constraints()?;
        Ok(Value::SequenceOf(result))
    }

    fn set_of_body(&mut self, schema: &SetOf, header: Header) -> Result<Value> {
        self.require_constructed(header)?;

        let mut result = schema.clone();
        let element = schema.element().clone();
        let canonical = self.options.rules.is_canonical();
        let mut previous: Option<Vec<u8>> = None;

        self.decode_children(header.length, |d| {
            let start = d.pos;
            let item = d.item_with_schema(&element)?;

            if canonical {
                // X.690 Section 11.6: ascending order of the encodings,
                // shorter ones read as if zero-padded at the end.
                let encoding = d.bytes[start..d.pos].to_vec();
                if let Some(previous) = &previous {
                    if set_of_cmp(previous, &encoding) == core::cmp::Ordering::Greater {
                        return Err(d.error(ErrorKind::Noncanonical));
                    }
                }
                previous = Some(encoding);
            }

            result.push_unchecked(item);
            Ok(())
        })?;

        if !result.has_value() {
            result = schema.with_items(Vec::new())?;
        }

        result.check_constraints()?;
        Ok(Value::SetOf(result))
    }

    fn sequence_body(&mut self, schema: &Sequence, header: Header) -> Result<Value> {
        self.require_constructed(header)?;

        let mut result = schema.clone();
        let components = schema.components().clone();
        let mut cursor = 0usize;

        self.decode_children(header.length, |d| {
            let tag = d.peek_header()?.tag;

            // Resolve the position within the disambiguation window,
            // skipping over omitted OPTIONAL/DEFAULT components.
            let position = components.position_near_tag(cursor, tag).ok_or_else(|| {
                d.error(ErrorKind::UnexpectedTag {
                    expected: None,
                    actual: tag,
                })
            })?;

            let value = d.item_with_schema(components.type_at(position)?)?;
            result.set_position(position, value)?;
            cursor = position + 1;
            Ok(())
        })?;

        self.finish_record(&components, &mut result)?;
        Ok(Value::Sequence(result))
    }

    fn set_body(&mut self, schema: &Set, header: Header) -> Result<Value> {
        self.require_constructed(header)?;

        let mut result = schema.clone();
        let components = schema.components().clone();
        let canonical = self.options.rules.is_canonical();
        let mut previous_tag: Option<Tag> = None;

        self.decode_children(header.length, |d| {
            let tag = d.peek_header()?.tag;

            if canonical {
                // X.690 Section 9.3 / 10.3: components in ascending tag
                // order.
                if let Some(previous) = previous_tag {
                    if previous >= tag {
                        return Err(d.error(ErrorKind::Noncanonical));
                    }
                }
                previous_tag = Some(tag);
            }

            let position = components.position_of_tag(tag).ok_or_else(|| {
                d.error(ErrorKind::UnexpectedTag {
                    expected: None,
                    actual: tag,
                })
            })?;

            let value = d.item_with_schema(components.type_at(position)?)?;
            result.set_position(position, value)?;
            Ok(())
        })?;

        self.finish_record(&components, &mut result)?;
        Ok(Value::Set(result))
    }

    /// Post-decode steps shared by `SEQUENCE` and `SET`: fill defaults,
    /// verify required components, run constraints and resolve open types.
    fn finish_record<R: RecordOps>(&self, components: &NamedTypes, record: &mut R) -> Result<()> {
        record.fill_defaults();

        for (position, item) in components.iter().enumerate() {
            let present = record.component_at(position)?.is_some();

            if !present && matches!(item.kind(), ComponentKind::Required) {
                return Err(ErrorKind::MissingComponent {
                    name: item.name().into(),
                }
                .into());
            }
        }

        record.check_constraints()?;

        if self.options.resolve_open_types {
            self.resolve_open_types(components, record)?;
        }

        Ok(())
    }

    /// Open-type second pass: re-decode `ANY` carriers under the schema
    /// keyed by their discriminator sibling.
    fn resolve_open_types<R: RecordOps>(
        &self,
        components: &NamedTypes,
        record: &mut R,
    ) -> Result<()> {
        for (position, item) in components.iter().enumerate() {
            let Some(open_type) = item.open_type() else {
                continue;
            };

            let Some(Value::Any(carrier)) = record.component_at(position)? else {
                continue;
            };

            let discriminator_pos = components.position_of(open_type.discriminator())?;
            let Some(discriminator) = record.component_at(discriminator_pos)? else {
                continue;
            };

            let Some(resolved_schema) = open_type.resolve(discriminator) else {
                // No binding for this discriminator value: the carrier
                // stays opaque.
                continue;
            };

            let raw = carrier.value()?.clone();
            let resolved = decode_exact(&raw, Some(resolved_schema), &self.options)?;
            record.set_position_unchecked(position, resolved);
        }

        Ok(())
    }

    /// Schemaless decoding: values are typed by their wire tags.
    fn item_schemaless(&mut self) -> Result<Value> {
        let header = self.peek_header()?;
        let tag = header.tag;

        if tag.is_universal() {
            let Some(schema) = universal_schema(tag) else {
                return Err(self.error(ErrorKind::UnknownTag { tag }));
            };

            if let Some(schema) = schema {
                return self.item_with_schema(&schema);
            }

            // Universal constructed container without component knowledge:
            // decode the children schemalessly.
            let header = self.read_header()?;
            self.require_constructed(header)?;

            let mut items = Vec::new();
            self.decode_children(header.length, |d| {
                items.push(d.item_schemaless()?);
                Ok(())
            })?;

            return if tag == Tag::SET {
                let mut set = SetOf::schema(Value::Any(Any::schema())).with_items(Vec::new())?;
                items.into_iter().for_each(|i| set.push_unchecked(i));
                Ok(Value::SetOf(set))
            } else {
                let mut seq =
                    SequenceOf::schema(Value::Any(Any::schema())).with_items(Vec::new())?;
                items.into_iter().for_each(|i| seq.push_unchecked(i));
                Ok(Value::SequenceOf(seq))
            };
        }

        if tag.is_constructed() {
            // Assume an explicit wrapper: decode the inner value and record
            // the extra outer tagging.
            let mut probe = self.clone();
            let header = probe.read_header()?;

            let attempt = probe.in_content(header.length, |d| d.item_schemaless());
            if let Ok(inner) = attempt {
                if let Ok(tagged) = inner.tag_set().tag_explicitly(tag) {
                    *self = probe;
                    return Ok(inner.retagged(tagged));
                }
            }
        }

        // Opaque fallback: capture the whole TLV in an untagged ANY, which
        // re-emits it verbatim.
        let raw = self.capture_tlv()?;
        Ok(Value::Any(Any::schema().with_value(raw)?))
    }
}

/// Decode-time record operations shared by `SEQUENCE` and `SET`.
trait RecordOps {
    fn component_at(&self, position: usize) -> Result<Option<&Value>>;
    fn set_position_unchecked(&mut self, position: usize, value: Value);
    fn fill_defaults(&mut self);
    fn check_constraints(&self) -> Result<()>;
}

impl RecordOps for Sequence {
    fn component_at(&self, position: usize) -> Result<Option<&Value>> {
        Sequence::component_at(self, position)
    }

    fn set_position_unchecked(&mut self, position: usize, value: Value) {
        Sequence::set_position_unchecked(self, position, value);
    }

    fn fill_defaults(&mut self) {
        Sequence::fill_defaults(self);
    }

    fn check_constraints(&self) -> Result<()> {
        Sequence::check_constraints(self)
    }
}

impl RecordOps for Set {
    fn component_at(&self, position: usize) -> Result<Option<&Value>> {
        Set::component_at(self, position)
    }

    fn set_position_unchecked(&mut self, position: usize, value: Value) {
        Set::set_position_unchecked(self, position, value);
    }

    fn fill_defaults(&mut self) {
        Set::fill_defaults(self);
    }

    fn check_constraints(&self) -> Result<()> {
        Set::check_constraints(self)
    }
}

/// Fallible counterpart of `slice::split_at`.
fn try_split(bytes: &[u8], mid: usize) -> Option<(&[u8], &[u8])> {
    (mid <= bytes.len()).then(|| bytes.split_at(mid))
}

/// Interpret string-body octets as ASCII text.
fn ascii_body(bytes: &[u8], tag: Tag) -> Result<String> {
    if !bytes.is_ascii() {
        return Err(ErrorKind::Value { tag }.into());
    }

    String::from_utf8(bytes.to_vec()).map_err(|_| ErrorKind::Value { tag }.into())
}

/// Compare two `SET OF` element encodings, the shorter treated as padded
/// with zero octets at its end (X.690 Section 11.6).
pub(crate) fn set_of_cmp(a: &[u8], b: &[u8]) -> core::cmp::Ordering {
    use core::cmp::Ordering;

    let common = a.len().min(b.len());

    match a[..common].cmp(&b[..common]) {
        Ordering::Equal => {
            let tail = if a.len() > b.len() {
                &a[common..]
            } else {
                &b[common..]
            };

            if tail.iter().all(|&byte| byte == 0) {
                Ordering::Equal
            } else if a.len() > b.len() {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        other => other,
    }
}

/// Untagged sibling of a tagged `CHOICE` schema, for alternative dispatch
/// inside the explicit wrapper.
fn untagged(choice: &Choice) -> Choice {
    choice.retagged(TagSet::untagged())
}

/// Default schema for a universal tag.
///
/// `Some(None)` marks the universal containers, which decode schemalessly
/// child by child.
#[allow(clippy::option_option)]
fn universal_schema(tag: Tag) -> Option<Option<Value>> {
    if tag == Tag::SEQUENCE || tag == Tag::SET {
        return Some(None);
    }

    let schema = match tag.number().value() {
        1 => Value::Boolean(Boolean::schema()),
        2 => Value::Integer(Integer::schema()),
        3 => Value::BitString(BitString::schema()),
        4 => Value::OctetString(OctetString::schema()),
        5 => Value::Null(Null::schema()),
        6 => Value::ObjectIdentifier(ObjectIdentifier::schema()),
        9 => Value::Real(Real::schema()),
        10 => Value::Enumerated(Enumerated::schema(crate::NamedValues::default())),
        23 => Value::UtcTime(UtcTime::schema()),
        24 => Value::GeneralizedTime(GeneralizedTime::schema()),
        _ => {
            let kind = StrKind::for_tag(tag)?;
            Value::CharacterString(CharacterString::schema(kind))
        }
    };

    Some(Some(schema))
}

#[cfg(test)]
mod tests {
    use super::{decode, decode_exact, decode_with, set_of_cmp, DecoderOptions};
    use crate::asn1::{Integer, Value};
    use crate::ErrorKind;
    use core::cmp::Ordering;
    use hex_literal::hex;

    #[test]
    fn schemaless_integer() {
        let (value, rest) = decode(&hex!("02 01 2A")).unwrap();
        assert!(rest.is_empty());

        let Value::Integer(int) = value else {
            panic!("expected INTEGER");
        };
        assert_eq!(int.to_i64().unwrap(), 42);
    }

    #[test]
    fn remainder_returned() {
        let (_, rest) = decode(&hex!("02 01 2A 05 00")).unwrap();
        assert_eq!(rest, hex!("05 00"));

        let strict = decode_exact(&hex!("02 01 2A 05 00"), None, &DecoderOptions::ber());
        assert!(matches!(
            strict.err().map(crate::Error::into_kind),
            Some(ErrorKind::TrailingData { .. })
        ));
    }

    #[test]
    fn underrun_reports_missing_bytes() {
        let err = decode(&hex!("02 05 01 02")).unwrap_err();
        assert!(err.is_incomplete());
    }

    #[test]
    fn reserved_length_rejected() {
        let err = decode_with(&hex!("02 FF 00"), &Value::Integer(Integer::schema()))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Length { .. }));
    }

    #[test]
    fn set_of_comparator_pads_with_zeroes() {
        assert_eq!(set_of_cmp(b"\x01\x02", b"\x01\x02"), Ordering::Equal);
        assert_eq!(set_of_cmp(b"\x01", b"\x01\x00"), Ordering::Equal);
        assert_eq!(set_of_cmp(b"\x01", b"\x01\x01"), Ordering::Less);
        assert_eq!(set_of_cmp(b"\x02", b"\x01\xFF"), Ordering::Greater);
    }
}
