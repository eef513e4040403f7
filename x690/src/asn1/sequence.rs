//! ASN.1 `SEQUENCE` and `SET` support.

use crate::asn1::value_metadata;
use crate::asn1::Value;
use crate::constraint::Subject;
use crate::namedtype::ComponentKind;
use crate::{ConstraintSet, ErrorKind, NamedTypes, Result, Tag, TagSet};

macro_rules! record_type {
    ($ty:ident, $asn1_name:literal) => {
        #[doc = concat!("ASN.1 `", $asn1_name, "` value: a positional list of components")]
        /// matching a named-type table.
        #[derive(Clone, Debug, PartialEq)]
        pub struct $ty {
            tag_set: TagSet,
            constraints: ConstraintSet,
            components: NamedTypes,
            inner: Option<Vec<Option<Value>>>,
        }

        value_metadata!($ty);

        impl $ty {
            /// Declared component table.
            pub fn components(&self) -> &NamedTypes {
                &self.components
            }

            /// Component value stored under `name`, `None` when absent.
            pub fn component(&self, name: &str) -> Result<Option<&Value>> {
                let position = self.components.position_of(name)?;
                self.component_at(position)
            }

            /// Component value stored at `position`, `None` when absent.
            pub fn component_at(&self, position: usize) -> Result<Option<&Value>> {
                let values = self
                    .inner
                    .as_ref()
                    .ok_or(ErrorKind::NoValue)?;

                Ok(values.get(position).and_then(Option::as_ref))
            }

            /// Sibling of this object with the component `name` set to
            /// `value`.
            ///
            /// The value must match the declared component type.
            pub fn with_component(&self, name: &str, value: Value) -> Result<Self> {
                let position = self.components.position_of(name)?;
                let mut v = self.clone();
                v.set_position(position, value)?;
                v.check_constraints()?;
                Ok(v)
            }

            /// Number of components holding a value.
            pub fn present_count(&self) -> usize {
                self.inner
                    .as_ref()
                    .map_or(0, |values| values.iter().flatten().count())
            }

            /// Store `value` at `position` after checking it against the
            /// declared component type.
            pub(crate) fn set_position(&mut self, position: usize, value: Value) -> Result<()> {
                let declared = self.components.type_at(position)?;

                if !declared.is_same_type_as(&value) {
                    return Err(ErrorKind::ComponentMismatch.into());
                }

                self.set_position_unchecked(position, value);
                Ok(())
            }

            /// Store `value` at `position` without a component-type check.
            ///
            /// Open-type resolution replaces an `ANY` carrier with a value of
            /// the resolved type, which by design does not match the declared
            /// carrier type.
            pub(crate) fn set_position_unchecked(&mut self, position: usize, value: Value) {
                let len = self.components.len();
                let values = self
                    .inner
                    .get_or_insert_with(|| vec![None; len]);

                if position < values.len() {
                    values[position] = Some(value);
                }
            }

            /// Fill every absent defaulted component with its declared
            /// default.
            pub(crate) fn fill_defaults(&mut self) {
                let len = self.components.len();
                let values = self
                    .inner
                    .get_or_insert_with(|| vec![None; len]);

                for (position, item) in self.components.iter().enumerate() {
                    if values[position].is_none() {
                        if let ComponentKind::Defaulted(default) = item.kind() {
                            values[position] = Some(default.clone());
                        }
                    }
                }
            }

            pub(crate) fn check_constraints(&self) -> Result<()> {
                if self.inner.is_none() {
                    return Ok(());
                }

                self.constraints
                    .check(&[Subject::Size(self.present_count())])
            }
        }
    };
}

record_type!(Sequence, "SEQUENCE");
record_type!(Set, "SET");

impl Sequence {
    /// The `SEQUENCE` schema over the given component table.
    ///
    /// Components sharing a tag are admissible as long as position
    /// disambiguates them.
    pub fn schema(components: NamedTypes) -> Self {
        Self {
            tag_set: TagSet::of(Tag::SEQUENCE),
            constraints: ConstraintSet::none(),
            components,
            inner: None,
        }
    }
}

impl Set {
    /// The `SET` schema over the given component table.
    ///
    /// Position carries no information on the wire, so the component tags
    /// must be globally unambiguous.
    pub fn schema(components: NamedTypes) -> Result<Self> {
        components.ensure_unambiguous()?;

        Ok(Self {
            tag_set: TagSet::of(Tag::SET),
            constraints: ConstraintSet::none(),
            components,
            inner: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Sequence, Set};
    use crate::asn1::{Integer, Null, OctetString, Value};
    use crate::{NamedType, NamedTypes};

    fn example_components() -> NamedTypes {
        NamedTypes::new([
            NamedType::new("null", Value::from(Null::schema())),
            NamedType::optional("payload", Value::from(OctetString::schema())),
            NamedType::defaulted("age", Value::from(Integer::new(33))).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn component_round_trip() {
        let seq = Sequence::schema(example_components())
            .with_component("null", Value::from(Null::new()))
            .unwrap()
            .with_component("payload", Value::from(OctetString::from("quick brown")))
            .unwrap();

        assert_eq!(seq.present_count(), 2);
        assert!(seq.component("null").unwrap().is_some());
        assert!(seq.component("age").unwrap().is_none());
    }

    #[test]
    fn component_type_enforced() {
        let seq = Sequence::schema(example_components());
        assert!(seq
            .with_component("null", Value::from(Integer::new(1)))
            .is_err());
    }

    #[test]
    fn defaults_fill_absent_components() {
        let mut seq = Sequence::schema(example_components())
            .with_component("null", Value::from(Null::new()))
            .unwrap();

        seq.fill_defaults();
        let age = seq.component("age").unwrap().unwrap();
        assert_eq!(age, &Value::from(Integer::new(33)));
    }

    #[test]
    fn set_requires_unambiguous_tags() {
        let ambiguous = NamedTypes::new([
            NamedType::new("a", Value::from(Integer::schema())),
            NamedType::new("b", Value::from(Integer::schema())),
        ])
        .unwrap();

        assert!(Set::schema(ambiguous).is_err());

        let distinct = NamedTypes::new([
            NamedType::new("a", Value::from(Integer::schema())),
            NamedType::new("b", Value::from(OctetString::schema())),
        ])
        .unwrap();

        assert!(Set::schema(distinct).is_ok());
    }
}
