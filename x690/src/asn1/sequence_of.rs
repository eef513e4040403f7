//! ASN.1 `SEQUENCE OF` and `SET OF` support.

use crate::asn1::value_metadata;
use crate::asn1::Value;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};

macro_rules! of_type {
    ($ty:ident, $tag:expr, $asn1_name:literal) => {
        #[doc = concat!("ASN.1 `", $asn1_name, "` value: a homogeneous collection of a")]
        /// single declared element type.
        #[derive(Clone, Debug, PartialEq)]
        pub struct $ty {
            tag_set: TagSet,
            constraints: ConstraintSet,
            element: Box<Value>,
            inner: Option<Vec<Value>>,
        }

        value_metadata!($ty);

        impl $ty {
            #[doc = concat!("The `", $asn1_name, "` schema over the given element type.")]
            pub fn schema(element: Value) -> Self {
                Self {
                    tag_set: TagSet::of($tag),
                    constraints: ConstraintSet::none(),
                    element: Box::new(element),
                    inner: None,
                }
            }

            /// Declared element type.
            pub fn element(&self) -> &Value {
                &self.element
            }

            /// Get the elements.
            pub fn items(&self) -> Result<&[Value]> {
                self.inner
                    .as_deref()
                    .ok_or_else(|| ErrorKind::NoValue.into())
            }

            /// Number of elements.
            pub fn len(&self) -> Result<usize> {
                Ok(self.items()?.len())
            }

            /// Is the collection empty?
            pub fn is_empty(&self) -> Result<bool> {
                Ok(self.items()?.is_empty())
            }

            /// Element at `index`.
            pub fn get(&self, index: usize) -> Result<&Value> {
                self.items()?
                    .get(index)
                    .ok_or_else(|| ErrorKind::NoValue.into())
            }

            /// Sibling of this object holding `items`; every element must be
            /// of the declared element type.
            pub fn with_items<I: IntoIterator<Item = Value>>(&self, items: I) -> Result<Self> {
                let items: Vec<Value> = items.into_iter().collect();

                for item in &items {
                    if !self.element.is_same_type_as(item) {
                        return Err(ErrorKind::ComponentMismatch.into());
                    }
                }

                let v = Self {
                    inner: Some(items),
                    ..self.clone()
                };
                v.check_constraints()?;
                Ok(v)
            }

            /// Append an element to this collection, initialising the payload
            /// if it was absent.
            pub(crate) fn push_unchecked(&mut self, item: Value) {
                self.inner.get_or_insert_with(Vec::new).push(item);
            }

            pub(crate) fn check_constraints(&self) -> Result<()> {
                match &self.inner {
                    Some(items) => self.constraints.check(&[Subject::Size(items.len())]),
                    None => Ok(()),
                }
            }
        }
    };
}

of_type!(SequenceOf, Tag::SEQUENCE, "SEQUENCE OF");
of_type!(SetOf, Tag::SET, "SET OF");

#[cfg(test)]
mod tests {
    use super::{SequenceOf, SetOf};
    use crate::asn1::{Integer, OctetString, Value};
    use crate::{Constraint, Tag};

    #[test]
    fn homogeneous_elements_only() {
        let schema = SequenceOf::schema(Value::from(Integer::schema()));

        let ok = schema.with_items([
            Value::from(Integer::new(1)),
            Value::from(Integer::new(2)),
        ]);
        assert_eq!(ok.unwrap().len().unwrap(), 2);

        let bad = schema.with_items([Value::from(OctetString::from("x"))]);
        assert!(bad.is_err());
    }

    #[test]
    fn set_of_uses_set_tag() {
        let schema = SetOf::schema(Value::from(Integer::schema()));
        assert_eq!(schema.tag_set().base_tag(), Some(Tag::SET));
    }

    #[test]
    fn size_constraint_checked() {
        let schema = SequenceOf::schema(Value::from(Integer::schema()))
            .constrained([Constraint::size_range(1, 2)])
            .unwrap();

        assert!(schema.with_items([Value::from(Integer::new(1))]).is_ok());
        assert!(schema.with_items::<[Value; 0]>([]).is_err());
    }

    #[test]
    fn schema_has_no_items() {
        assert!(SequenceOf::schema(Value::from(Integer::schema()))
            .items()
            .is_err());
    }
}
