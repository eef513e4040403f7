//! ASN.1 `BOOLEAN` support.

use crate::asn1::value_metadata;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};

/// ASN.1 `BOOLEAN` value.
#[derive(Clone, Debug, PartialEq)]
pub struct Boolean {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<bool>,
}

value_metadata!(Boolean);

impl Boolean {
    /// The `BOOLEAN` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::BOOLEAN),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// A `BOOLEAN` value.
    pub fn new(value: bool) -> Self {
        Self {
            inner: Some(value),
            ..Self::schema()
        }
    }

    /// Get the payload.
    pub fn value(&self) -> Result<bool> {
        self.inner.ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Sibling of this object holding `value`, checked against the
    /// constraints.
    pub fn with_value(&self, value: bool) -> Result<Self> {
        let v = Self {
            inner: Some(value),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        // BOOLEAN has no constrainable facets beyond single values, which
        // the constraint model expresses over integers; nothing to check.
        Ok(())
    }
}

impl From<bool> for Boolean {
    fn from(value: bool) -> Boolean {
        Boolean::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Boolean;
    use crate::{ErrorKind, Tag};

    #[test]
    fn schema_has_no_value() {
        let schema = Boolean::schema();
        assert!(!schema.has_value());
        assert_eq!(
            schema.value().err().map(crate::Error::into_kind),
            Some(ErrorKind::NoValue)
        );
    }

    #[test]
    fn value_round_trip() {
        assert!(Boolean::new(true).value().unwrap());
        assert!(!Boolean::new(false).value().unwrap());
    }

    #[test]
    fn implicit_subtype_keeps_base_tag() {
        let tagged = Boolean::schema().subtype_implicit(Tag::context(0));
        assert_eq!(tagged.tag_set().outer_tag(), Some(Tag::context(0)));
        assert_eq!(tagged.tag_set().base_tag(), Some(Tag::BOOLEAN));
    }
}
