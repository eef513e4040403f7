//! ASN.1 `BIT STRING` support.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, NamedValues, Result, Tag, TagSet};
use bitvec::order::Msb0;
use bitvec::vec::BitVec;
use core::ops::Add;

/// ASN.1 `BIT STRING` value: a finite ordered sequence of bits.
///
/// Initialisers accept the ASN.1 textual forms `'0101'B` and `'A98A'H` as
/// well as explicit bit and byte material. An optional named-bit table
/// assigns names to bit positions.
#[derive(Clone, Debug, PartialEq)]
pub struct BitString {
    tag_set: TagSet,
    constraints: ConstraintSet,
    named_bits: Option<NamedValues>,
    inner: Option<BitVec<u8, Msb0>>,
}

value_metadata!(BitString);

impl BitString {
    /// The `BIT STRING` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::BIT_STRING),
            constraints: ConstraintSet::none(),
            named_bits: None,
            inner: None,
        }
    }

    /// Schema with a named-bit table (bit position per name).
    pub fn with_named_bits(named_bits: NamedValues) -> Self {
        Self {
            named_bits: Some(named_bits),
            ..Self::schema()
        }
    }

    /// A `BIT STRING` value from individual bits.
    pub fn new<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        Self {
            inner: Some(bits.into_iter().collect()),
            ..Self::schema()
        }
    }

    /// A `BIT STRING` value from a textual initialiser: `'0101'B` or
    /// `'A98A'H` (or bare binary digits).
    pub fn from_text(text: &str) -> Result<Self> {
        Self::schema().with_text(text)
    }

    /// A `BIT STRING` value from content octets and a count of unused
    /// trailing bits.
    pub fn from_bytes(bytes: &[u8], unused: u8) -> Result<Self> {
        Self::schema().with_bytes(bytes, unused)
    }

    /// Get the payload.
    pub fn value(&self) -> Result<&BitVec<u8, Msb0>> {
        self.inner.as_ref().ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Number of bits in the payload.
    pub fn len(&self) -> Result<usize> {
        Ok(self.value()?.len())
    }

    /// Is the payload empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.value()?.is_empty())
    }

    /// Bit at position `index`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.value()?
            .get(index)
            .map(|bit| *bit)
            .ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Sub-string of the payload as a sibling of the same subtype.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        let bits = self.value()?;
        let end = end.min(bits.len());
        let piece: BitVec<u8, Msb0> = bits[start.min(end)..end].to_bitvec();

        Ok(Self {
            inner: Some(piece),
            ..self.clone()
        })
    }

    /// Content octets plus the count of unused trailing bits in the final
    /// octet.
    pub fn to_bytes(&self) -> Result<(Vec<u8>, u8)> {
        let bits = self.value()?;
        let unused = (8 - bits.len() % 8) % 8;
        let mut bytes = bits.clone();
        bytes.resize(bits.len() + unused, false);

        Ok((bytes.into_vec(), unused as u8))
    }

    /// Sibling of this object holding the given bits.
    pub fn with_bits<I: IntoIterator<Item = bool>>(&self, bits: I) -> Result<Self> {
        let v = Self {
            inner: Some(bits.into_iter().collect()),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    /// Sibling of this object holding the bits of a textual initialiser.
    pub fn with_text(&self, text: &str) -> Result<Self> {
        self.with_bits(parse_text(text)?)
    }

    /// Sibling of this object holding `bytes` with `unused` trailing bits
    /// discarded.
    pub fn with_bytes(&self, bytes: &[u8], unused: u8) -> Result<Self> {
        if unused > 7 || (bytes.is_empty() && unused != 0) {
            return Err(ErrorKind::Value {
                tag: Tag::BIT_STRING,
            }
            .into());
        }

        let mut bits: BitVec<u8, Msb0> = BitVec::from_slice(bytes);
        bits.truncate(bytes.len() * 8 - usize::from(unused));
        self.with_bits(bits)
    }

    /// Sibling of this object with the named bits set.
    pub fn with_names(&self, names: &[&str]) -> Result<Self> {
        let table = self.named_bits.as_ref().ok_or(ErrorKind::ConstraintViolation {
            constraint: "named-bit",
        })?;

        let mut positions = Vec::with_capacity(names.len());
        for name in names {
            let position = table
                .value_of(name)
                .and_then(num_traits::ToPrimitive::to_usize)
                .ok_or(ErrorKind::ConstraintViolation {
                    constraint: "named-bit",
                })?;
            positions.push(position);
        }

        let len = positions.iter().max().map_or(0, |max| max + 1);
        let mut bits: BitVec<u8, Msb0> = BitVec::repeat(false, len);
        for position in positions {
            bits.set(position, true);
        }

        self.with_bits(bits)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(bits) => self.constraints.check(&[Subject::Size(bits.len())]),
            None => Ok(()),
        }
    }
}

impl Add<&BitString> for &BitString {
    type Output = Result<BitString>;

    fn add(self, other: &BitString) -> Result<BitString> {
        let mut bits = self.value()?.clone();
        bits.extend_from_bitslice(other.value()?);

        Ok(BitString {
            inner: Some(bits),
            ..self.clone()
        })
    }
}

/// Parse the `'0101'B` / `'A98A'H` textual forms (quotes optional for the
/// binary form).
fn parse_text(text: &str) -> Result<BitVec<u8, Msb0>> {
    let malformed = || ErrorKind::Value {
        tag: Tag::BIT_STRING,
    };

    let (digits, radix) = if let Some(stripped) = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix("'B").or_else(|| t.strip_suffix("'b")))
    {
        (stripped, 2)
    } else if let Some(stripped) = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix("'H").or_else(|| t.strip_suffix("'h")))
    {
        (stripped, 16)
    } else {
        (text, 2)
    };

    let mut bits = BitVec::new();

    for digit in digits.chars() {
        let value = digit.to_digit(radix).ok_or_else(malformed)?;
        let width = if radix == 2 { 1 } else { 4 };

        for shift in (0..width).rev() {
            bits.push(value >> shift & 1 == 1);
        }
    }

    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::BitString;
    use crate::NamedValues;

    #[test]
    fn textual_binary_form() {
        let bs = BitString::from_text("'101'B").unwrap();
        assert_eq!(bs.len().unwrap(), 3);
        assert!(bs.get(0).unwrap());
        assert!(!bs.get(1).unwrap());
        assert!(bs.get(2).unwrap());
    }

    #[test]
    fn textual_hex_form() {
        let bs = BitString::from_text("'A9'H").unwrap();
        assert_eq!(bs.len().unwrap(), 8);
        let (bytes, unused) = bs.to_bytes().unwrap();
        assert_eq!(bytes, [0xA9]);
        assert_eq!(unused, 0);
    }

    #[test]
    fn byte_round_trip_with_unused_bits() {
        let bs = BitString::from_bytes(&[0xA9, 0x8A], 1).unwrap();
        assert_eq!(bs.len().unwrap(), 15);

        let (bytes, unused) = bs.to_bytes().unwrap();
        assert_eq!(bytes, [0xA9, 0x8A]);
        assert_eq!(unused, 1);
    }

    #[test]
    fn unused_bits_bounded() {
        assert!(BitString::from_bytes(&[0xFF], 8).is_err());
        assert!(BitString::from_bytes(&[], 1).is_err());
    }

    #[test]
    fn concatenation_and_slicing() {
        let a = BitString::from_text("'10'B").unwrap();
        let b = BitString::from_text("'01'B").unwrap();
        let joined = (&a + &b).unwrap();

        assert_eq!(joined.len().unwrap(), 4);
        let middle = joined.slice(1, 3).unwrap();
        assert_eq!(middle.len().unwrap(), 2);
        assert!(!middle.get(0).unwrap());
        assert!(middle.get(1).unwrap());
    }

    #[test]
    fn named_bits() {
        let schema = BitString::with_named_bits(
            NamedValues::new([("digitalSignature", 0), ("keyEncipherment", 2)]).unwrap(),
        );
        let bs = schema.with_names(&["keyEncipherment"]).unwrap();

        assert_eq!(bs.len().unwrap(), 3);
        assert!(!bs.get(0).unwrap());
        assert!(bs.get(2).unwrap());
    }
}
