//! ASN.1 `ANY` support.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, Result, TagSet};
use bytes::Bytes;

/// ASN.1 `ANY` value: an opaque encoding captured from the substrate.
///
/// Untagged by default. An untagged `ANY` captures (and emits) a complete
/// TLV; a tagged one carries only the content octets under its own tags.
/// Late-bound fields pair an `ANY` carrier with an open-type table on the
/// enclosing named-type entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Any {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<Bytes>,
}

value_metadata!(Any);

impl Any {
    /// The `ANY` schema: no value, no tags.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::untagged(),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// An `ANY` value holding the given encoding.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            inner: Some(value.into()),
            ..Self::schema()
        }
    }

    /// Get the captured encoding.
    pub fn value(&self) -> Result<&Bytes> {
        self.inner.as_ref().ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Captured encoding as a byte slice.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        Ok(self.value()?.as_ref())
    }

    /// Number of captured octets.
    pub fn len(&self) -> Result<usize> {
        Ok(self.value()?.len())
    }

    /// Is the captured encoding empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.value()?.is_empty())
    }

    /// Sibling of this object holding `value`.
    pub fn with_value(&self, value: impl Into<Bytes>) -> Result<Self> {
        let v = Self {
            inner: Some(value.into()),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(bytes) => self.constraints.check(&[Subject::Size(bytes.len())]),
            None => Ok(()),
        }
    }
}

impl From<&[u8]> for Any {
    fn from(value: &[u8]) -> Any {
        Any::new(Bytes::copy_from_slice(value))
    }
}
