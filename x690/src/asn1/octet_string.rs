//! ASN.1 `OCTET STRING` support.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};
use bytes::Bytes;
use core::ops::Add;

/// ASN.1 `OCTET STRING` value: a finite byte sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct OctetString {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<Bytes>,
}

value_metadata!(OctetString);

impl OctetString {
    /// The `OCTET STRING` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::OCTET_STRING),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// An `OCTET STRING` value.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            inner: Some(value.into()),
            ..Self::schema()
        }
    }

    /// An `OCTET STRING` value from a textual initialiser: `'A98A'H` or
    /// `'0101'B`.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::schema().with_text(text)
    }

    /// Get the payload.
    pub fn value(&self) -> Result<&Bytes> {
        self.inner.as_ref().ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Payload as a byte slice.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        Ok(self.value()?.as_ref())
    }

    /// Number of octets in the payload.
    pub fn len(&self) -> Result<usize> {
        Ok(self.value()?.len())
    }

    /// Is the payload empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.value()?.is_empty())
    }

    /// Sub-string of the payload as a sibling of the same subtype.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        let bytes = self.value()?;
        let end = end.min(bytes.len());

        Ok(Self {
            inner: Some(bytes.slice(start.min(end)..end)),
            ..self.clone()
        })
    }

    /// Sibling of this object holding `value`, checked against the
    /// constraints.
    pub fn with_value(&self, value: impl Into<Bytes>) -> Result<Self> {
        let v = Self {
            inner: Some(value.into()),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    /// Sibling of this object holding the octets of a textual initialiser.
    pub fn with_text(&self, text: &str) -> Result<Self> {
        self.with_value(parse_text(text)?)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(bytes) => self.constraints.check(&[Subject::Size(bytes.len())]),
            None => Ok(()),
        }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> OctetString {
        OctetString::new(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> OctetString {
        OctetString::new(value)
    }
}

impl From<&str> for OctetString {
    fn from(value: &str) -> OctetString {
        OctetString::new(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl Add<&OctetString> for &OctetString {
    type Output = Result<OctetString>;

    fn add(self, other: &OctetString) -> Result<OctetString> {
        let mut joined = Vec::with_capacity(self.len()? + other.len()?);
        joined.extend_from_slice(self.as_bytes()?);
        joined.extend_from_slice(other.as_bytes()?);

        Ok(OctetString {
            inner: Some(joined.into()),
            ..self.clone()
        })
    }
}

/// Parse the `'A98A'H` / `'0101'B` textual forms into octets.
fn parse_text(text: &str) -> Result<Vec<u8>> {
    let malformed = || ErrorKind::Value {
        tag: Tag::OCTET_STRING,
    };

    if let Some(stripped) = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix("'H").or_else(|| t.strip_suffix("'h")))
    {
        if stripped.len() % 2 != 0 {
            return Err(malformed().into());
        }

        return stripped
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                let hex = core::str::from_utf8(pair).map_err(|_| malformed())?;
                u8::from_str_radix(hex, 16).map_err(|_| malformed().into())
            })
            .collect();
    }

    if let Some(stripped) = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix("'B").or_else(|| t.strip_suffix("'b")))
    {
        if stripped.len() % 8 != 0 {
            return Err(malformed().into());
        }

        return stripped
            .as_bytes()
            .chunks(8)
            .map(|bits| {
                let bin = core::str::from_utf8(bits).map_err(|_| malformed())?;
                u8::from_str_radix(bin, 2).map_err(|_| malformed().into())
            })
            .collect();
    }

    Err(malformed().into())
}
