//! ASN.1 `CHOICE` support.

use crate::asn1::value_metadata;
use crate::asn1::Value;
use crate::{ConstraintSet, ErrorKind, NamedTypes, Result, Tag, TagSet};

/// ASN.1 `CHOICE` value: exactly one tagged alternative.
///
/// A `CHOICE` is untagged by default; its effective tag set is that of the
/// chosen alternative. Tagging a `CHOICE` (always explicit) gives it tags of
/// its own.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    tag_set: TagSet,
    constraints: ConstraintSet,
    alternatives: NamedTypes,
    inner: Option<(usize, Box<Value>)>,
}

value_metadata!(Choice);

impl Choice {
    /// The `CHOICE` schema over the given alternatives.
    ///
    /// Alternatives are dispatched by tag alone, so their tags must be
    /// globally unambiguous.
    pub fn schema(alternatives: NamedTypes) -> Result<Self> {
        alternatives.ensure_unambiguous()?;

        Ok(Self {
            tag_set: TagSet::untagged(),
            constraints: ConstraintSet::none(),
            alternatives,
            inner: None,
        })
    }

    /// Declared alternatives.
    pub fn alternatives(&self) -> &NamedTypes {
        &self.alternatives
    }

    /// Name and value of the chosen alternative.
    pub fn chosen(&self) -> Result<(&str, &Value)> {
        let (position, value) = self
            .inner
            .as_ref()
            .ok_or(ErrorKind::UnresolvedChoice)?;

        Ok((self.alternatives.name_at(*position)?, value))
    }

    /// Value of the chosen alternative.
    pub fn chosen_value(&self) -> Result<&Value> {
        Ok(self.chosen()?.1)
    }

    /// Sibling of this object with the alternative `name` set to `value`.
    pub fn with_chosen(&self, name: &str, value: Value) -> Result<Self> {
        let position = self.alternatives.position_of(name)?;
        let declared = self.alternatives.type_at(position)?;

        if !declared.is_same_type_as(&value) {
            return Err(ErrorKind::ComponentMismatch.into());
        }

        Ok(Self {
            inner: Some((position, Box::new(value))),
            ..self.clone()
        })
    }

    /// Store the alternative decoded at `position`.
    pub(crate) fn set_chosen(&mut self, position: usize, value: Value) {
        self.inner = Some((position, Box::new(value)));
    }

    /// The tag set this value presents on the wire: its own when tagged,
    /// the chosen alternative's otherwise.
    pub fn effective_tag_set(&self) -> TagSet {
        if !self.tag_set.is_empty() {
            return self.tag_set.clone();
        }

        match &self.inner {
            Some((_, value)) => value.effective_tag_set(),
            None => TagSet::untagged(),
        }
    }

    /// Smallest outer tag among the alternatives, used when sorting an
    /// enclosing DER `SET`.
    pub(crate) fn min_outer_tag(&self) -> Option<Tag> {
        if let Some(tag) = self.tag_set.outer_tag() {
            return Some(tag);
        }

        self.alternatives
            .iter()
            .filter_map(|item| item.schema().min_outer_tag())
            .min()
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        Ok(())
    }
}
