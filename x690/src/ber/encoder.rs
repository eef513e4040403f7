//! BER-family encoder.
//!
//! For a value with effective tag set `t_0 ∘ … ∘ t_n` (outermost first) the
//! encoder emits the body of the base universal type and wraps it once per
//! tag, innermost first. [`EncoderOptions`] selects the dialect: definite
//! or indefinite constructed form, primitive chunking (CER) and the DER
//! ordering rules.

use crate::asn1::{BitString, RealValue, Sequence, Set, Value};
use crate::ber::decoder::set_of_cmp;
use crate::ber::EncodingRules;
use crate::namedtype::ComponentKind;
use crate::{ErrorKind, NamedTypes, Result, Tag};
use tracing::trace;

/// Encoder configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EncoderOptions {
    rules: EncodingRules,
    def_mode: bool,
    max_chunk_size: usize,
}

impl EncoderOptions {
    /// Basic Encoding Rules, definite lengths.
    pub fn ber() -> Self {
        Self {
            rules: EncodingRules::Ber,
            def_mode: true,
            max_chunk_size: 0,
        }
    }

    /// Basic Encoding Rules, indefinite form for constructed encodings.
    pub fn ber_indefinite() -> Self {
        Self {
            def_mode: false,
            ..Self::ber()
        }
    }

    /// Canonical Encoding Rules: indefinite constructed form, primitive
    /// strings chunked at 1000.
    pub fn cer() -> Self {
        Self {
            rules: EncodingRules::Cer,
            def_mode: false,
            max_chunk_size: 1000,
        }
    }

    /// Distinguished Encoding Rules: definite lengths everywhere, sorted
    /// sets, mandatory `DEFAULT` omission.
    pub fn der() -> Self {
        Self {
            rules: EncodingRules::Der,
            def_mode: true,
            max_chunk_size: 0,
        }
    }

    /// Override the chunk size for string types; `0` disables chunking.
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Selected rule set.
    pub fn rules(&self) -> EncodingRules {
        self.rules
    }
}

/// Encode `value` under BER with definite lengths.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    encode_with(value, &EncoderOptions::ber())
}

/// Encode `value` under explicit [`EncoderOptions`].
pub fn encode_with(value: &Value, options: &EncoderOptions) -> Result<Vec<u8>> {
    Encoder::new(*options).encode(value)
}

/// BER-family encoder.
#[derive(Copy, Clone, Debug)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    /// Create an encoder with the given options.
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Encode one value to its octet stream.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        trace!(value = value.type_name(), "encode value");

        let mut out = Vec::new();
        self.encode_value(value, &mut out)?;
        Ok(out)
    }

    fn encode_value(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        value.check_constraints()?;

        match value {
            Value::Choice(choice) => {
                let chosen = choice.chosen_value()?;

                if choice.tag_set().is_empty() {
                    // An untagged CHOICE is transparent on the wire.
                    return self.encode_value(chosen, out);
                }

                let mut body = Vec::new();
                self.encode_value(chosen, &mut body)?;
                self.wrap(choice.tag_set().tags(), body, true, out)
            }
            Value::Any(any) => {
                let raw = any.value()?;

                if any.tag_set().is_empty() {
                    // An untagged ANY already carries a complete TLV.
                    out.extend_from_slice(raw);
                    return Ok(());
                }

                self.wrap(any.tag_set().tags(), raw.to_vec(), false, out)
            }
            _ => {
                let tags = value.tag_set().tags();
                if tags.is_empty() {
                    return Err(ErrorKind::ComponentMismatch.into());
                }

                let (body, constructed) = self.body_of(value)?;
                self.wrap(tags, body, constructed, out)
            }
        }
    }

    /// Wrap `body` in the given tags, innermost last in `tags` order.
    fn wrap(
        &self,
        tags: &[Tag],
        body: Vec<u8>,
        constructed: bool,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let mut current = body;
        let mut is_constructed = constructed;

        for tag in tags.iter().rev() {
            // Explicit wrapper tags carry the constructed form themselves
            // (tag_explicitly forces it); a chunked primitive body forces
            // it on an otherwise primitive tag.
            let form = is_constructed || tag.is_constructed();
            current = self.tlv(*tag, current, form)?;
            is_constructed = true;
        }

        out.extend_from_slice(&current);
        Ok(())
    }

    /// Emit one TLV around `content`.
    fn tlv(&self, tag: Tag, content: Vec<u8>, constructed: bool) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(content.len() + 6);
        write_tag(tag, constructed, &mut out);

        let indefinite = constructed && !self.options.def_mode && !self.options.rules.is_der();

        if indefinite {
            out.push(0x80);
            out.extend_from_slice(&content);
            out.extend_from_slice(&[0x00, 0x00]);
        } else {
            write_length(content.len(), &mut out)?;
            out.extend_from_slice(&content);
        }

        Ok(out)
    }

    /// Body octets of the base universal type, plus the constructed flag.
    fn body_of(&self, value: &Value) -> Result<(Vec<u8>, bool)> {
        match value {
            Value::Boolean(v) => Ok((vec![if v.value()? { 0xFF } else { 0x00 }], false)),
            Value::Integer(v) => Ok((v.value()?.to_signed_bytes_be(), false)),
            Value::Enumerated(v) => Ok((v.value()?.to_signed_bytes_be(), false)),
            Value::Null(v) => {
                v.value()?;
                Ok((Vec::new(), false))
            }
            Value::ObjectIdentifier(v) => Ok((oid_body(v.arcs()?)?, false)),
            Value::Real(v) => Ok((real_body(v.value()?)?, false)),
            Value::BitString(v) => self.bit_string_bodies(v),
            Value::OctetString(v) => self.string_bodies(v.as_bytes()?),
            Value::CharacterString(v) => self.string_bodies(&v.to_octets()?),
            Value::UtcTime(v) => {
                if self.options.rules.is_canonical() && !v.is_canonical()? {
                    return Err(ErrorKind::Noncanonical.into());
                }
                self.string_bodies(v.value()?.as_bytes())
            }
            Value::GeneralizedTime(v) => {
                if self.options.rules.is_canonical() && !v.is_canonical()? {
                    return Err(ErrorKind::Noncanonical.into());
                }
                self.string_bodies(v.value()?.as_bytes())
            }
            Value::SequenceOf(v) => {
                let mut body = Vec::new();
                for item in v.items()? {
                    self.encode_value(item, &mut body)?;
                }
                Ok((body, true))
            }
            Value::SetOf(v) => {
                let mut encodings = Vec::new();
                for item in v.items()? {
                    let mut encoding = Vec::new();
                    self.encode_value(item, &mut encoding)?;
                    encodings.push(encoding);
                }

                if self.options.rules.is_canonical() {
                    // X.690 Section 11.6: ascending order of the encodings.
                    encodings.sort_by(|a, b| set_of_cmp(a, b));
                }

                Ok((encodings.concat(), true))
            }
            Value::Sequence(v) => Ok((self.sequence_body(v)?, true)),
            Value::Set(v) => Ok((self.set_body(v)?, true)),
            // Handled in encode_value.
            Value::Choice(_) | Value::Any(_) => Err(ErrorKind::ComponentMismatch.into()),
        }
    }

    /// `BIT STRING` body: primitive, or chunked constructed form when the
    /// payload exceeds the chunk size (counted in bits).
    fn bit_string_bodies(&self, v: &BitString) -> Result<(Vec<u8>, bool)> {
        let bit_len = v.len()?;
        let chunk_bits = self.chunk_size(bit_len);

        if chunk_bits == 0 {
            let (bytes, unused) = v.to_bytes()?;
            let mut body = Vec::with_capacity(bytes.len() + 1);
            body.push(unused);
            body.extend_from_slice(&bytes);
            return Ok((body, false));
        }

        let mut body = Vec::new();
        let mut start = 0;

        while start < bit_len {
            let end = (start + chunk_bits).min(bit_len);
            let (bytes, unused) = v.slice(start, end)?.to_bytes()?;

            let mut chunk = Vec::with_capacity(bytes.len() + 1);
            chunk.push(unused);
            chunk.extend_from_slice(&bytes);

            body.extend_from_slice(&self.tlv(Tag::BIT_STRING, chunk, false)?);
            start = end;
        }

        Ok((body, true))
    }

    /// `OCTET STRING`-shaped body: primitive, or chunked constructed form
    /// of `OCTET STRING` segments when the payload exceeds the chunk size.
    fn string_bodies(&self, octets: &[u8]) -> Result<(Vec<u8>, bool)> {
        let chunk_size = self.chunk_size(octets.len());

        if chunk_size == 0 {
            return Ok((octets.to_vec(), false));
        }

        let mut body = Vec::new();
        for chunk in octets.chunks(chunk_size) {
            body.extend_from_slice(&self.tlv(Tag::OCTET_STRING, chunk.to_vec(), false)?);
        }

        Ok((body, true))
    }

    /// Effective chunk size: `0` when the payload fits in primitive form.
    ///
    /// `BIT STRING` payloads measure in bits, the octet-shaped types in
    /// octets.
    fn chunk_size(&self, len: usize) -> usize {
        let max = self.options.max_chunk_size;

        if max > 0 && len > max {
            max
        } else {
            0
        }
    }

    fn sequence_body(&self, v: &Sequence) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.record_children(v.components(), |i| v.component_at(i), |child| {
            self.encode_value(child, &mut body)
        })?;
        Ok(body)
    }

    fn set_body(&self, v: &Set) -> Result<Vec<u8>> {
        let components = v.components();

        if !self.options.rules.is_canonical() {
            let mut body = Vec::new();
            self.record_children(components, |i| v.component_at(i), |child| {
                self.encode_value(child, &mut body)
            })?;
            return Ok(body);
        }

        // Canonical SET: children sorted by the tag of the declared
        // component; an untagged CHOICE sorts by its minimum alternative
        // tag.
        let mut children: Vec<(Option<Tag>, Vec<u8>)> = Vec::new();

        self.record_children(components, |i| v.component_at(i), |child| {
            let mut encoding = Vec::new();
            self.encode_value(child, &mut encoding)?;
            children.push((child.min_outer_tag(), encoding));
            Ok(())
        })?;

        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children.into_iter().flat_map(|(_, e)| e).collect())
    }

    /// Walk record components applying the `OPTIONAL`/`DEFAULT` omission
    /// rules, feeding present children to `emit`.
    fn record_children<'v>(
        &self,
        components: &NamedTypes,
        get: impl Fn(usize) -> Result<Option<&'v Value>>,
        mut emit: impl FnMut(&'v Value) -> Result<()>,
    ) -> Result<()> {
        for (position, item) in components.iter().enumerate() {
            match get(position)? {
                None => match item.kind() {
                    ComponentKind::Required => {
                        return Err(ErrorKind::MissingComponent {
                            name: item.name().into(),
                        }
                        .into());
                    }
                    ComponentKind::Optional | ComponentKind::Defaulted(_) => continue,
                },
                Some(child) => {
                    // A value equal to the declared default is omitted:
                    // mandatory under DER, and the library's choice under
                    // BER.
                    if let ComponentKind::Defaulted(default) = item.kind() {
                        if child == default {
                            continue;
                        }
                    }

                    emit(child)?;
                }
            }
        }

        Ok(())
    }
}

/// Emit the identifier octets.
fn write_tag(tag: Tag, constructed: bool, out: &mut Vec<u8>) {
    let leading = tag.class().octet() | if constructed { 0b0010_0000 } else { 0 };
    let number = tag.number().value();

    if tag.number().is_short_form() {
        out.push(leading | number as u8);
    } else {
        out.push(leading | 0x1F);
        write_base128(u64::from(number), out);
    }
}

/// Emit the length octets in minimal definite form.
fn write_length(len: usize, out: &mut Vec<u8>) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| ErrorKind::Overflow)?;

    if len < 0x80 {
        out.push(len as u8);
        return Ok(());
    }

    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();

    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
    Ok(())
}

/// Emit a base-128 big-endian varint with continuation bits.
fn write_base128(mut value: u64, out: &mut Vec<u8>) {
    let mut stack = [0u8; 10];
    let mut i = stack.len();

    loop {
        i -= 1;
        stack[i] = (value & 0x7F) as u8;
        value >>= 7;

        if value == 0 {
            break;
        }
    }

    let groups = &mut stack[i..];
    for j in 0..groups.len() - 1 {
        groups[j] |= 0x80;
    }

    out.extend_from_slice(groups);
}

/// `OBJECT IDENTIFIER` content octets.
fn oid_body(arcs: &[u64]) -> Result<Vec<u8>> {
    if arcs.len() < 2 {
        return Err(ErrorKind::OidMalformed.into());
    }

    // X.690 Section 8.19.4: the first two arcs fold into one
    // sub-identifier.
    let first = arcs[0]
        .checked_mul(40)
        .and_then(|v| v.checked_add(arcs[1]))
        .ok_or(ErrorKind::OidMalformed)?;

    let mut out = Vec::with_capacity(arcs.len() + 1);
    write_base128(first, &mut out);

    for &arc in &arcs[2..] {
        write_base128(arc, &mut out);
    }

    Ok(out)
}

/// `REAL` content octets; finite base-2 values use the binary form, finite
/// base-10 values the ISO 6093 NR3 character form.
fn real_body(value: RealValue) -> Result<Vec<u8>> {
    match value {
        RealValue::Finite { mantissa: 0, .. } => Ok(Vec::new()),
        RealValue::Finite {
            mantissa,
            base: 2,
            exponent,
        } => Ok(binary_real_body(mantissa, exponent)),
        RealValue::Finite {
            mantissa,
            base: 10,
            exponent,
        } => {
            let mut out = vec![0x03];
            out.extend_from_slice(format!("{}E{}", mantissa, exponent).as_bytes());
            Ok(out)
        }
        RealValue::Finite { .. } => Err(ErrorKind::Value { tag: Tag::REAL }.into()),
        RealValue::Infinity { negative: false } => Ok(vec![0x40]),
        RealValue::Infinity { negative: true } => Ok(vec![0x41]),
        RealValue::NotANumber => Ok(vec![0x42]),
        RealValue::MinusZero => Ok(vec![0x43]),
    }
}

fn binary_real_body(mantissa: i64, exponent: i32) -> Vec<u8> {
    let negative = mantissa < 0;
    let mut magnitude = mantissa.unsigned_abs();
    let mut exponent = i64::from(exponent);

    // X.690 Section 11.3.1: the mantissa is zero or odd.
    while magnitude & 1 == 0 {
        magnitude >>= 1;
        exponent += 1;
    }

    // Minimal two's-complement exponent octets.
    let exp_bytes = exponent.to_be_bytes();
    let mut skip = 0;
    while skip < exp_bytes.len() - 1 {
        let redundant = (exp_bytes[skip] == 0x00 && exp_bytes[skip + 1] < 0x80)
            || (exp_bytes[skip] == 0xFF && exp_bytes[skip + 1] >= 0x80);
        if !redundant {
            break;
        }
        skip += 1;
    }
    let exp_octets = &exp_bytes[skip..];

    let mut leading = 0x80u8;
    if negative {
        leading |= 0x40;
    }

    let mut out = Vec::new();
    match exp_octets.len() {
        1 => out.push(leading),
        2 => out.push(leading | 0x01),
        3 => out.push(leading | 0x02),
        n => {
            out.push(leading | 0x03);
            out.push(n as u8);
        }
    }
    out.extend_from_slice(exp_octets);

    let mantissa_bytes = magnitude.to_be_bytes();
    let skip = mantissa_bytes
        .iter()
        .take_while(|&&b| b == 0)
        .count()
        .min(mantissa_bytes.len() - 1);
    out.extend_from_slice(&mantissa_bytes[skip..]);

    out
}

#[cfg(test)]
mod tests {
    use super::{encode, encode_with, EncoderOptions};
    use crate::asn1::{BitString, Boolean, Integer, Null, ObjectIdentifier, Value};
    use hex_literal::hex;

    #[test]
    fn integer_bodies_are_minimal() {
        assert_eq!(encode(&Value::Integer(Integer::new(0))).unwrap(), hex!("02 01 00"));
        assert_eq!(encode(&Value::Integer(Integer::new(127))).unwrap(), hex!("02 01 7F"));
        assert_eq!(
            encode(&Value::Integer(Integer::new(128))).unwrap(),
            hex!("02 02 00 80")
        );
        assert_eq!(encode(&Value::Integer(Integer::new(-1))).unwrap(), hex!("02 01 FF"));
        assert_eq!(
            encode(&Value::Integer(Integer::new(-129))).unwrap(),
            hex!("02 02 FF 7F")
        );
    }

    #[test]
    fn boolean_and_null() {
        assert_eq!(encode(&Value::Boolean(Boolean::new(true))).unwrap(), hex!("01 01 FF"));
        assert_eq!(encode(&Value::Boolean(Boolean::new(false))).unwrap(), hex!("01 01 00"));
        assert_eq!(encode(&Value::Null(Null::new())).unwrap(), hex!("05 00"));
    }

    #[test]
    fn oid_folds_first_two_arcs() {
        let oid: ObjectIdentifier = "1.3.6.1".parse().unwrap();
        assert_eq!(
            encode(&Value::ObjectIdentifier(oid)).unwrap(),
            hex!("06 03 2B 06 01")
        );
    }

    #[test]
    fn oid_large_arcs_use_varints() {
        let oid = ObjectIdentifier::new(vec![1, 3, 6, 0, 0xFF_FFFE]).unwrap();
        assert_eq!(
            encode(&Value::ObjectIdentifier(oid)).unwrap(),
            hex!("06 06 2B 06 00 BF FF 7E")
        );
    }

    #[test]
    fn bit_string_prepends_unused_count() {
        let bits = BitString::from_bytes(&hex!("A9 8A"), 1).unwrap();
        assert_eq!(
            encode(&Value::BitString(bits)).unwrap(),
            hex!("03 03 01 A9 8A")
        );
    }

    #[test]
    fn chunking_splits_long_octet_strings() {
        use crate::asn1::OctetString;

        let payload = vec![0xAB; 5];
        let value = Value::OctetString(OctetString::new(payload));

        let options = EncoderOptions::ber().with_max_chunk_size(2);
        let encoded = encode_with(&value, &options).unwrap();

        // Constructed form: three OCTET STRING segments of 2 + 2 + 1.
        assert_eq!(
            encoded,
            hex!("24 0B 04 02 AB AB 04 02 AB AB 04 01 AB")
        );
    }
}
