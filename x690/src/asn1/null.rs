//! ASN.1 `NULL` support.

use crate::asn1::value_metadata;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};

/// ASN.1 `NULL` value: the empty payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Null {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<()>,
}

value_metadata!(Null);

impl Null {
    /// The `NULL` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::NULL),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// The `NULL` value.
    pub fn new() -> Self {
        Self {
            inner: Some(()),
            ..Self::schema()
        }
    }

    /// Assert this object holds the (empty) payload.
    pub fn value(&self) -> Result<()> {
        self.inner.ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Sibling of this object holding the payload.
    pub fn with_value(&self) -> Self {
        Self {
            inner: Some(()),
            ..self.clone()
        }
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        Ok(())
    }
}

impl Default for Null {
    fn default() -> Self {
        Self::new()
    }
}
